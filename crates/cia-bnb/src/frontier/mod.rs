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

//! Open-node containers.
//!
//! A frontier owns the open nodes of the search and decides the exploration
//! order. The engine hands over the children of each expanded node as one
//! batch, in control index order, and pops one node per iteration.
//!
//! Submodules:
//! - `strategy`: `FrontierStrategy`, the user-facing selection.
//! - `dfs`: LIFO stack with greedy child ordering.
//! - `bfs`: best-bound-first priority queue.
//! - `dbt`: depth-first stack that defers unpromising children to a
//!   best-first heap once an incumbent exists.

pub mod bfs;
pub mod dbt;
pub mod dfs;
pub mod strategy;

use crate::node::SearchNode;
use cia_model::num::SolverFloat;

/// A container of open search nodes.
pub trait Frontier<T>
where
    T: SolverFloat,
{
    /// Returns the name of the frontier.
    fn name(&self) -> &str;

    /// Moves all `children` of one expanded node into the frontier.
    ///
    /// `children` is left empty; its allocation is kept by the caller.
    fn push_children(&mut self, children: &mut Vec<SearchNode<T>>);

    /// Removes and returns the next node to expand.
    fn pop(&mut self) -> Option<SearchNode<T>>;

    /// Returns the number of open nodes.
    fn len(&self) -> usize;

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Notifies the frontier that a better incumbent was found.
    fn on_incumbent_updated(&mut self, objective: T) {
        let _ = objective;
    }

    /// Drops all open nodes but keeps the allocations.
    fn clear(&mut self);

    /// Returns how many nodes were deferred out of depth-first order.
    #[inline]
    fn deferred_count(&self) -> u64 {
        0
    }
}

impl<T> std::fmt::Debug for dyn Frontier<T>
where
    T: SolverFloat,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Frontier({}, open: {})", self.name(), self.len())
    }
}

impl<T> std::fmt::Display for dyn Frontier<T>
where
    T: SolverFloat,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Frontier({})", self.name())
    }
}
