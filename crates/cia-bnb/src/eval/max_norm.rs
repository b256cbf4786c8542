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

//! Bound for the maximum norm `max_{i,j} |acc_i[j]|`.
//!
//! The bound of a node is the largest absolute accumulated deviation seen so
//! far. Extending the prefix takes the maximum with the new column, so the
//! bound is monotone and equals `eta` at a leaf.

use crate::{
    eval::{evaluator::BoundEvaluator, for_each_determined, with_margin},
    node::SearchNode,
};
use cia_model::{norm::CiaNorm, num::SolverFloat, problem::Problem};

#[derive(Debug, Clone, Copy, Default)]
pub struct MaxNormEvaluator;

impl MaxNormEvaluator {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl<T> BoundEvaluator<T> for MaxNormEvaluator
where
    T: SolverFloat,
{
    #[inline]
    fn name(&self) -> &str {
        "MaxNormEvaluator"
    }

    #[inline]
    fn norm(&self) -> CiaNorm {
        CiaNorm::MaxNorm
    }

    #[inline]
    fn bound(&self, parent_bound: T, deviations: &[T], _row_sums: &mut [T]) -> T {
        deviations
            .iter()
            .fold(parent_bound, |bound, value| bound.max(value.abs()))
    }

    fn lookahead(&self, problem: &Problem<T>, node: &SearchNode<T>) -> T {
        let mut best = node.bound();
        for_each_determined(problem, node, |_, value| {
            best = best.max(with_margin(value.abs()));
        });
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_is_running_maximum() {
        let evaluator = MaxNormEvaluator::new();
        let mut row_sums = [0.0f64; 2];
        assert_eq!(evaluator.bound(0.0, &[-0.3, 0.3], &mut row_sums), 0.3);
        assert_eq!(evaluator.bound(0.5, &[-0.3, 0.3], &mut row_sums), 0.5);
        assert_eq!(evaluator.bound(0.5, &[0.1, -0.7], &mut row_sums), 0.7);
    }

    #[test]
    fn test_name_and_norm() {
        let evaluator = MaxNormEvaluator::new();
        assert_eq!(BoundEvaluator::<f64>::name(&evaluator), "MaxNormEvaluator");
        assert_eq!(BoundEvaluator::<f64>::norm(&evaluator), CiaNorm::MaxNorm);
    }
}
