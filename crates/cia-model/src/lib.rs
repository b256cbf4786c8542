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

//! # CIA Model
//!
//! **Problem description and solution types for Combinatorial Integral Approximation.**
//!
//! A relaxed control signal `b_rel ∈ [0, 1]^{n_c × n_t}` on a fixed time grid is
//! approximated by a binary signal `b_bin` with exactly one active control per
//! interval, subject to switching budgets, dwell times, up-time limits,
//! allowed transitions, allowed controls per interval and continuity with a
//! pre-horizon state. This crate is the data layer shared by the search
//! engine (`cia_bnb`) and the solver facade (`cia_solver`).
//!
//! ## Architecture
//!
//! * **`index`**: strongly typed `ControlIndex` / `IntervalIndex`.
//! * **`num`**: the `SolverFloat` numeric trait.
//! * **`norm`**: the objective norms (`max_norm`, `column_sum_norm`, `row_sum_norm`).
//! * **`problem`**: the immutable `Problem` and its validating `ProblemBuilder`.
//! * **`trajectory`**: `BinaryTrajectory`, SOS1 by construction.
//! * **`objective`**: direct recomputation of `eta` from a trajectory.
//! * **`validation`**: run-based feasibility check of complete trajectories.
//! * **`error`**: `ConfigurationError`, the error type for everything that fails before search.
//!
//! ## Design Philosophy
//!
//! 1.  **Type Safety**: controls and intervals use distinct index types.
//! 2.  **Memory Layout**: matrices are flattened control-major vectors; boolean matrices are bitsets.
//! 3.  **Fail-Fast**: the builder rejects malformed shapes and values instead of coercing them.

pub mod error;
pub mod index;
pub mod norm;
pub mod num;
pub mod objective;
pub mod problem;
pub mod trajectory;
pub mod validation;
