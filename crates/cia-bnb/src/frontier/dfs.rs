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

//! Depth-first frontier.
//!
//! A plain LIFO stack. The children of a node are ordered before they are
//! pushed so that the most promising one is expanded next: smallest bound
//! first, then the fewest switches used, then the lowest control index.
//! This greedy dive tends to find a good incumbent early, which in turn
//! makes bound pruning effective.

use crate::{frontier::Frontier, node::SearchNode};
use cia_model::num::{SolverFloat, total_order};

/// Sorts children so that the preferred one comes first.
///
/// The sort is stable; children arrive in control index order, which acts
/// as the final tie-break.
pub(crate) fn order_children<T>(children: &mut [SearchNode<T>])
where
    T: SolverFloat,
{
    children.sort_by(|a, b| {
        total_order(a.bound(), b.bound())
            .then_with(|| a.max_switch_count().cmp(&b.max_switch_count()))
    });
}

#[derive(Debug, Clone)]
pub struct DepthFirstFrontier<T> {
    stack: Vec<SearchNode<T>>,
}

impl<T> Default for DepthFirstFrontier<T> {
    fn default() -> Self {
        Self { stack: Vec::new() }
    }
}

impl<T> DepthFirstFrontier<T>
where
    T: SolverFloat,
{
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn preallocated(capacity: usize) -> Self {
        Self {
            stack: Vec::with_capacity(capacity),
        }
    }
}

impl<T> Frontier<T> for DepthFirstFrontier<T>
where
    T: SolverFloat,
{
    #[inline]
    fn name(&self) -> &str {
        "DepthFirstFrontier"
    }

    fn push_children(&mut self, children: &mut Vec<SearchNode<T>>) {
        order_children(children);
        self.stack.extend(children.drain(..).rev());
    }

    #[inline]
    fn pop(&mut self) -> Option<SearchNode<T>> {
        self.stack.pop()
    }

    #[inline]
    fn len(&self) -> usize {
        self.stack.len()
    }

    #[inline]
    fn clear(&mut self) {
        self.stack.clear();
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
    fn test_children_popped_in_greedy_order() {
        let p = problem();
        let mut arena = PathArena::new();
        let mut next_id = 0;
        let root = SearchNode::root(&p, 0);

        let mut frontier = DepthFirstFrontier::new();
        let mut batch = children(&p, &mut arena, &root, &mut next_id);
        frontier.push_children(&mut batch);
        assert!(batch.is_empty());
        assert_eq!(frontier.len(), 3);

        let order: Vec<u64> = std::iter::from_fn(|| frontier.pop()).map(|n| n.id()).collect();
        // Bounds are [0.75, 0.5, 0.75]; ties keep control order.
        assert_eq!(order, vec![2, 1, 3]);
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_dives_before_backtracking() {
        let p = problem();
        let mut arena = PathArena::new();
        let mut next_id = 0;
        let root = SearchNode::root(&p, 0);

        let mut frontier = DepthFirstFrontier::preallocated(8);
        let mut batch = children(&p, &mut arena, &root, &mut next_id);
        frontier.push_children(&mut batch);

        let first = frontier.pop().unwrap();
        let mut batch = children(&p, &mut arena, &first, &mut next_id);
        frontier.push_children(&mut batch);

        let next = frontier.pop().unwrap();
        assert_eq!(next.depth(), 2);
        assert_eq!(next.parent_id(), Some(first.id()));
        assert_eq!(frontier.len(), 4);

        frontier.clear();
        assert!(frontier.is_empty());
    }
}
