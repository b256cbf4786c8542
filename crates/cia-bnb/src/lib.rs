// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! CIA-BnB: branch-and-bound for combinatorial integral approximation
//!
//! Engine crate that searches for the binary control trajectory closest to a
//! relaxed one under the problem's norm. The search is split into small,
//! swappable parts: a constraint checker for candidate moves, a bound
//! evaluator per norm, a frontier per exploration strategy and monitors for
//! logging, tracing and termination.
//!
//! Core flow
//! - Build a `cia_model::problem::Problem<T>`.
//! - Pick a `frontier::strategy::FrontierStrategy` (`dfs`, `bfs` or `dbt`).
//! - Compose monitors for budgets, interruption, logging and VBC traces.
//! - Run `bnb::BnbSolver`, optionally with a warm-start trajectory.
//!
//! Guarantees
//! - Bounds never decrease along a path and equal the objective at a leaf,
//!   so exhausting the frontier proves optimality.
//! - Children are generated in control index order and every frontier breaks
//!   ties deterministically; identical inputs give identical searches.
//! - Only leaves accepted by the constraint checker become incumbents.
//!
//! Module map
//! - `bnb`: the solver and its search session.
//! - `checker`: incremental feasibility of a single move.
//! - `eval`: bound evaluators and the frozen-control lookahead.
//! - `frontier`: open-node containers and strategy selection.
//! - `monitor`: tree-search monitors (limits, interrupt, log, VBC, composite).
//! - `node`, `path`: search nodes and the shared decision-path arena.
//! - `extract`, `incumbent`, `result`, `stats`: what a search returns.

pub mod bnb;
pub mod checker;
pub mod error;
pub mod eval;
pub mod extract;
pub mod frontier;
pub mod incumbent;
pub mod monitor;
pub mod node;
pub mod path;
pub mod result;
pub mod stats;
