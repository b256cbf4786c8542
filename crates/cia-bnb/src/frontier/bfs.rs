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

//! Best-first frontier.
//!
//! Pops the open node with the smallest bound. Ties prefer deeper nodes,
//! which are closer to a leaf, and then the older node. The order is total,
//! so the exploration is deterministic.

use crate::{frontier::Frontier, node::SearchNode};
use cia_model::num::{SolverFloat, total_order};
use std::{cmp::Ordering, collections::BinaryHeap};

/// Heap entry ordering nodes by bound ascending, depth descending and id
/// ascending. `BinaryHeap` is a max-heap, so the comparison is inverted.
#[derive(Debug, Clone)]
pub(crate) struct BestFirstEntry<T>(pub(crate) SearchNode<T>);

impl<T> Ord for BestFirstEntry<T>
where
    T: SolverFloat,
{
    fn cmp(&self, other: &Self) -> Ordering {
        total_order(other.0.bound(), self.0.bound())
            .then_with(|| self.0.depth().cmp(&other.0.depth()))
            .then_with(|| other.0.id().cmp(&self.0.id()))
    }
}

impl<T> PartialOrd for BestFirstEntry<T>
where
    T: SolverFloat,
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> PartialEq for BestFirstEntry<T>
where
    T: SolverFloat,
{
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for BestFirstEntry<T> where T: SolverFloat {}

#[derive(Debug, Clone)]
pub struct BestFirstFrontier<T>
where
    T: SolverFloat,
{
    heap: BinaryHeap<BestFirstEntry<T>>,
}

impl<T> Default for BestFirstFrontier<T>
where
    T: SolverFloat,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BestFirstFrontier<T>
where
    T: SolverFloat,
{
    #[inline]
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    #[inline]
    pub fn preallocated(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    /// Returns the smallest bound among the open nodes.
    #[inline]
    pub fn best_bound(&self) -> Option<T> {
        self.heap.peek().map(|entry| entry.0.bound())
    }
}

impl<T> Frontier<T> for BestFirstFrontier<T>
where
    T: SolverFloat,
{
    #[inline]
    fn name(&self) -> &str {
        "BestFirstFrontier"
    }

    fn push_children(&mut self, children: &mut Vec<SearchNode<T>>) {
        self.heap.extend(children.drain(..).map(BestFirstEntry));
    }

    #[inline]
    fn pop(&mut self) -> Option<SearchNode<T>> {
        self.heap.pop().map(|entry| entry.0)
    }

    #[inline]
    fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    fn clear(&mut self) {
        self.heap.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        frontier::test_support::{children, problem},
        path::PathArena,
    };

    #[test]
    fn test_pops_smallest_bound_then_oldest() {
        let p = problem();
        let mut arena = PathArena::new();
        let mut next_id = 0;
        let root = SearchNode::root(&p, 0);

        let mut frontier = BestFirstFrontier::new();
        let mut batch = children(&p, &mut arena, &root, &mut next_id);
        frontier.push_children(&mut batch);
        assert_eq!(frontier.best_bound(), Some(0.5));

        let order: Vec<u64> = std::iter::from_fn(|| frontier.pop()).map(|n| n.id()).collect();
        assert_eq!(order, vec![2, 1, 3]);
    }

    #[test]
    fn test_prefers_deeper_node_on_equal_bound() {
        let p = problem();
        let mut arena = PathArena::new();
        let mut next_id = 0;
        let root = SearchNode::root(&p, 0);

        let mut frontier = BestFirstFrontier::preallocated(16);
        let mut batch = children(&p, &mut arena, &root, &mut next_id);
        frontier.push_children(&mut batch);

        assert_eq!(frontier.pop().unwrap().id(), 2);
        let first = frontier.pop().unwrap();
        assert_eq!(first.id(), 1);

        let mut batch = children(&p, &mut arena, &first, &mut next_id);
        let bounds: Vec<f64> = batch.iter().map(|n| n.bound()).collect();
        assert_eq!(bounds, vec![1.5, 0.75, 1.0]);
        frontier.push_children(&mut batch);

        // Node 5 and node 3 share the bound 0.75; the deeper one goes first.
        let order: Vec<u64> = std::iter::from_fn(|| frontier.pop()).map(|n| n.id()).collect();
        assert_eq!(order, vec![5, 3, 6, 4]);
    }
}
