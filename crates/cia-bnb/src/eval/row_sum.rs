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

//! Bound for the row sum norm `max_i Σ_j |acc_i[j]|`.
//!
//! Row sums only grow as intervals are assigned. The evaluator keeps the
//! running sum of every row in the node and bounds `eta` by the largest one.

use crate::{
    eval::{evaluator::BoundEvaluator, for_each_determined, with_margin},
    node::SearchNode,
};
use cia_model::{norm::CiaNorm, num::SolverFloat, problem::Problem};

#[derive(Debug, Clone, Copy, Default)]
pub struct RowSumEvaluator;

impl RowSumEvaluator {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl<T> BoundEvaluator<T> for RowSumEvaluator
where
    T: SolverFloat,
{
    #[inline]
    fn name(&self) -> &str {
        "RowSumEvaluator"
    }

    #[inline]
    fn norm(&self) -> CiaNorm {
        CiaNorm::RowSumNorm
    }

    fn bound(&self, parent_bound: T, deviations: &[T], row_sums: &mut [T]) -> T {
        debug_assert_eq!(
            deviations.len(),
            row_sums.len(),
            "called `RowSumEvaluator::bound` with mismatched buffers"
        );
        let mut bound = parent_bound;
        for (sum, value) in row_sums.iter_mut().zip(deviations) {
            *sum = *sum + value.abs();
            bound = bound.max(*sum);
        }
        bound
    }

    /// A determined control still contributes `|acc_i[n_t − 1]|` to its row.
    fn lookahead(&self, problem: &Problem<T>, node: &SearchNode<T>) -> T {
        let row_sums = node.row_sums();
        let mut best = node.bound();
        for_each_determined(problem, node, |control, value| {
            best = best.max(with_margin(row_sums[control.get()] + value.abs()));
        });
        best
    }
}
