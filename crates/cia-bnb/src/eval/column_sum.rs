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

//! Bound for the column sum norm `max_j Σ_i |acc_i[j]|`.

use crate::{
    eval::{evaluator::BoundEvaluator, for_each_determined, with_margin},
    node::SearchNode,
};
use cia_model::{norm::CiaNorm, num::SolverFloat, problem::Problem};

/// Tracks the largest column sum of the assigned prefix.
///
/// Column sums are accumulated in ascending control order, matching the
/// direct evaluation, so the leaf bound reproduces `eta` bit for bit.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnSumEvaluator;

impl ColumnSumEvaluator {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl<T> BoundEvaluator<T> for ColumnSumEvaluator
where
    T: SolverFloat,
{
    #[inline]
    fn name(&self) -> &str {
        "ColumnSumEvaluator"
    }

    #[inline]
    fn norm(&self) -> CiaNorm {
        CiaNorm::ColumnSumNorm
    }

    #[inline]
    fn bound(&self, parent_bound: T, deviations: &[T], _row_sums: &mut [T]) -> T {
        let column = deviations
            .iter()
            .fold(T::zero(), |sum, value| sum + value.abs());
        parent_bound.max(column)
    }

    /// The final column contains the final deviation of every control, so
    /// the sum over the determined ones bounds it from below.
    fn lookahead(&self, problem: &Problem<T>, node: &SearchNode<T>) -> T {
        let mut determined = T::zero();
        let mut any = false;
        for_each_determined(problem, node, |_, value| {
            determined = determined + value.abs();
            any = true;
        });
        if any {
            node.bound().max(with_margin(determined))
        } else {
            node.bound()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_sums_column() {
        let evaluator = ColumnSumEvaluator::new();
        let mut row_sums = [0.0f64; 3];
        assert_eq!(evaluator.bound(0.0, &[-0.25, 0.5, -0.25], &mut row_sums), 1.0);
        assert_eq!(evaluator.bound(1.5, &[-0.25, 0.5, -0.25], &mut row_sums), 1.5);
        assert_eq!(row_sums, [0.0; 3]);
    }
}
