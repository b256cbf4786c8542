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

//! Dynamic backtracking frontier.
//!
//! A depth-first stack that, once an incumbent exists, refuses to dive into
//! children that look unpromising. With incumbent `ub` and global lower
//! bound `lb` (the smallest bound of any open node) the frontier computes
//!
//! `cutoff = ub − beta · (ub − lb)`
//!
//! and defers every new child whose bound exceeds the cutoff to a
//! best-first heap. The top of the stack is tested again when it is popped,
//! since the incumbent may have improved after it was pushed. Deferred nodes
//! are resumed, best first, once the stack runs dry. Skipping the deferred siblings is a jump back to the shallow
//! node with the best bound instead of the chronologically previous one.
//!
//! `beta` interpolates between the two extremes: as `beta → 0` the cutoff
//! approaches `ub`, where the engine prunes anyway, and the frontier is
//! plain depth-first search; at `beta = 1` every child above the global
//! lower bound is deferred. Before the first incumbent nothing is deferred.
//!
//! Every node is deferred at most once and popped exactly once, so the
//! search terminates and the order is a deterministic function of the
//! inputs.

use crate::{
    frontier::{Frontier, bfs::BestFirstEntry, dfs::order_children},
    node::SearchNode,
};
use cia_model::num::{SolverFloat, constant};
use std::collections::BinaryHeap;

#[derive(Debug, Clone)]
pub struct DynamicBacktrackingFrontier<T>
where
    T: SolverFloat,
{
    beta: T,
    /// Nodes together with the smallest bound at or below their position.
    stack: Vec<(SearchNode<T>, T)>,
    deferred: BinaryHeap<BestFirstEntry<T>>,
    incumbent: Option<T>,
    deferred_total: u64,
}

impl<T> DynamicBacktrackingFrontier<T>
where
    T: SolverFloat,
{
    /// Creates an empty frontier.
    ///
    /// `beta` is expected in `(0, 1]`; see `FrontierStrategy::validate`.
    #[inline]
    pub fn new(beta: f64) -> Self {
        debug_assert!(
            beta > 0.0 && beta <= 1.0,
            "called `DynamicBacktrackingFrontier::new` with beta = {}",
            beta
        );
        Self {
            beta: constant(beta),
            stack: Vec::new(),
            deferred: BinaryHeap::new(),
            incumbent: None,
            deferred_total: 0,
        }
    }

    #[inline]
    pub fn beta(&self) -> T {
        self.beta
    }

    /// Returns the smallest bound among the open nodes.
    pub fn lower_bound(&self) -> Option<T> {
        let stacked = self.stack.last().map(|(_, min)| *min);
        let deferred = self.deferred.peek().map(|entry| entry.0.bound());
        match (stacked, deferred) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Returns the number of nodes currently parked in the deferred heap.
    #[inline]
    pub fn num_deferred(&self) -> usize {
        self.deferred.len()
    }

    #[inline]
    fn push_stack(&mut self, node: SearchNode<T>) {
        let bound = node.bound();
        let min = self
            .stack
            .last()
            .map_or(bound, |(_, below)| below.min(bound));
        self.stack.push((node, min));
    }

    #[inline]
    fn defer(&mut self, node: SearchNode<T>) {
        self.deferred_total = self.deferred_total.saturating_add(1);
        self.deferred.push(BestFirstEntry(node));
    }

    fn cutoff(&self, incumbent: T, children: &[SearchNode<T>]) -> T {
        let lower = children
            .iter()
            .map(|n| n.bound())
            .chain(self.lower_bound())
            .fold(incumbent, |acc, b| acc.min(b));
        incumbent - self.beta * (incumbent - lower)
    }
}

impl<T> Frontier<T> for DynamicBacktrackingFrontier<T>
where
    T: SolverFloat,
{
    #[inline]
    fn name(&self) -> &str {
        "DynamicBacktrackingFrontier"
    }

    fn push_children(&mut self, children: &mut Vec<SearchNode<T>>) {
        order_children(children);

        let Some(incumbent) = self.incumbent else {
            for child in children.drain(..).rev() {
                self.push_stack(child);
            }
            return;
        };

        let cutoff = self.cutoff(incumbent, children);
        for child in children.drain(..).rev() {
            if child.bound() > cutoff {
                self.defer(child);
            } else {
                self.push_stack(child);
            }
        }
    }

    fn pop(&mut self) -> Option<SearchNode<T>> {
        while let Some((node, _)) = self.stack.pop() {
            let Some(incumbent) = self.incumbent else {
                return Some(node);
            };
            // `lower_bound` no longer sees the popped node.
            let lower = self.lower_bound().map_or(node.bound(), |lb| lb.min(node.bound()));
            let cutoff = incumbent - self.beta * (incumbent - incumbent.min(lower));
            if node.bound() > cutoff {
                self.defer(node);
            } else {
                return Some(node);
            }
        }
        self.deferred.pop().map(|entry| entry.0)
    }

    #[inline]
    fn len(&self) -> usize {
        self.stack.len() + self.deferred.len()
    }

    #[inline]
    fn on_incumbent_updated(&mut self, objective: T) {
        self.incumbent = Some(objective);
    }

    fn clear(&mut self) {
        self.stack.clear();
        self.deferred.clear();
        self.incumbent = None;
        self.deferred_total = 0;
    }

    #[inline]
    fn deferred_count(&self) -> u64 {
        self.deferred_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        frontier::test_support::{children, problem},
        path::PathArena,
    };

    fn drain(frontier: &mut DynamicBacktrackingFrontier<f64>) -> Vec<u64> {
        std::iter::from_fn(|| frontier.pop()).map(|n| n.id()).collect()
    }

    #[test]
    fn test_behaves_as_dfs_without_incumbent() {
        let p = problem();
        let mut arena = PathArena::new();
        let mut next_id = 0;
        let root = SearchNode::root(&p, 0);

        let mut frontier = DynamicBacktrackingFrontier::new(1.0);
        let mut batch = children(&p, &mut arena, &root, &mut next_id);
        frontier.push_children(&mut batch);
        assert_eq!(frontier.lower_bound(), Some(0.5));
        assert_eq!(frontier.num_deferred(), 0);
        assert_eq!(drain(&mut frontier), vec![2, 1, 3]);
        assert_eq!(frontier.deferred_count(), 0);
    }

    #[test]
    fn test_full_beta_defers_children_above_global_bound() {
        let p = problem();
        let mut arena = PathArena::new();
        let mut next_id = 0;
        let root = SearchNode::root(&p, 0);

        let mut frontier = DynamicBacktrackingFrontier::new(1.0);
        frontier.on_incumbent_updated(1.0);
        let mut batch = children(&p, &mut arena, &root, &mut next_id);
        frontier.push_children(&mut batch);

        // cutoff = lb = 0.5, so both 0.75 children are deferred.
        assert_eq!(frontier.num_deferred(), 2);
        assert_eq!(frontier.len(), 3);
        assert_eq!(frontier.deferred_count(), 2);

        let best = frontier.pop().unwrap();
        assert_eq!(best.id(), 2);

        // The children of node 2 have bounds [0.5, 1.0, 0.5]; the global
        // lower bound is still 0.5, so only the 1.0 child is deferred.
        let mut batch = children(&p, &mut arena, &best, &mut next_id);
        frontier.push_children(&mut batch);
        assert_eq!(frontier.deferred_count(), 3);

        // Stack first (4, 6), then the deferred heap best first (1, 3, 5).
        assert_eq!(drain(&mut frontier), vec![4, 6, 1, 3, 5]);
    }

    #[test]
    fn test_stacked_nodes_are_deferred_after_incumbent_improves() {
        let p = problem();
        let mut arena = PathArena::new();
        let mut next_id = 0;
        let root = SearchNode::root(&p, 0);

        let mut frontier = DynamicBacktrackingFrontier::new(1.0);
        let mut batch = children(&p, &mut arena, &root, &mut next_id);
        frontier.push_children(&mut batch);
        let best = frontier.pop().unwrap();
        assert_eq!(best.id(), 2);
        let mut batch = children(&p, &mut arena, &best, &mut next_id);
        frontier.push_children(&mut batch);
        assert_eq!(frontier.num_deferred(), 0);

        // Stack from the top: 4, 6, 5, 1, 3. Once 4 and 6 are gone the
        // global lower bound is 0.75 and node 5 (bound 1.0) is deferred.
        frontier.on_incumbent_updated(1.0);
        assert_eq!(drain(&mut frontier), vec![4, 6, 1, 3, 5]);
        assert_eq!(frontier.deferred_count(), 1);
    }

    #[test]
    fn test_small_beta_is_dfs() {
        let p = problem();
        let mut arena = PathArena::new();
        let mut next_id = 0;
        let root = SearchNode::root(&p, 0);

        let mut frontier = DynamicBacktrackingFrontier::new(1e-6);
        frontier.on_incumbent_updated(1.0);
        let mut batch = children(&p, &mut arena, &root, &mut next_id);
        frontier.push_children(&mut batch);
        assert_eq!(frontier.num_deferred(), 0);
        assert_eq!(drain(&mut frontier), vec![2, 1, 3]);
    }

    #[test]
    fn test_clear_resets_state() {
        let p = problem();
        let mut arena = PathArena::new();
        let mut next_id = 0;
        let root = SearchNode::root(&p, 0);

        let mut frontier = DynamicBacktrackingFrontier::new(0.5);
        frontier.on_incumbent_updated(0.6);
        let mut batch = children(&p, &mut arena, &root, &mut next_id);
        frontier.push_children(&mut batch);
        assert!(frontier.num_deferred() > 0);

        frontier.clear();
        assert!(frontier.is_empty());
        assert_eq!(frontier.lower_bound(), None);
        assert_eq!(frontier.deferred_count(), 0);
        assert_eq!(frontier.beta(), 0.5);
    }
}
