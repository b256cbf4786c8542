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

//! Bound evaluation for the approximation norms.
//!
//! Every evaluator maintains a lower bound on `eta` that only ever grows
//! along a branch. The bound of a node is the norm restricted to the columns
//! already assigned; extending the prefix can only add entries, so the bound
//! of a child is never smaller than its parent's. At a leaf the bound is the
//! exact objective.
//!
//! Besides the incremental bound, evaluators offer a lookahead for controls
//! whose switch budget is exhausted. Such a control cannot change its state
//! any more, which fixes its final accumulated deviation
//! `acc_i[n_t − 1]`. The lookahead is used for pruning only; it never
//! replaces the reported bound of a node.
//!
//! Submodules:
//! - `evaluator`: the `BoundEvaluator` trait.
//! - `max_norm`: `max_{i,j} |acc_i[j]|`.
//! - `column_sum`: `max_j Σ_i |acc_i[j]|`.
//! - `row_sum`: `max_i Σ_j |acc_i[j]|`.

pub mod column_sum;
pub mod evaluator;
pub mod max_norm;
pub mod row_sum;

use crate::node::SearchNode;
use cia_model::{
    index::{ControlIndex, IntervalIndex},
    num::{SolverFloat, constant},
    problem::Problem,
};

/// Relative slack subtracted from lookahead values before they are compared
/// against the incumbent.
pub const LOOKAHEAD_MARGIN: f64 = 1e-9;

/// Calls `f(control, final_deviation)` for every control whose final
/// accumulated deviation is already determined by the node.
///
/// A control is determined once its switch budget is exhausted: it keeps
/// its current state until the horizon ends. If the active control is
/// determined, it stays active and every other control stays inactive.
pub(crate) fn for_each_determined<T, F>(problem: &Problem<T>, node: &SearchNode<T>, mut f: F)
where
    T: SolverFloat,
    F: FnMut(ControlIndex, T),
{
    let depth = node.depth();
    let Some(last) = node.last_active() else {
        return;
    };
    if depth >= problem.num_intervals() {
        return;
    }

    let interval = IntervalIndex::new(depth);
    let remaining = problem.suffix_duration(interval);
    let all_determined = node.is_frozen(problem, last);

    for control in problem.controls() {
        if !all_determined && !node.is_frozen(problem, control) {
            continue;
        }
        let mut value = node.deviation(control) + problem.suffix_relaxed(control, interval);
        if control == last {
            value = value - remaining;
        }
        f(control, value);
    }
}

/// Lowers a lookahead value by the relative margin.
#[inline]
pub(crate) fn with_margin<T>(value: T) -> T
where
    T: SolverFloat,
{
    value - constant::<T>(LOOKAHEAD_MARGIN) * (T::one() + value.abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{eval::max_norm::MaxNormEvaluator, path::PathArena};
    use cia_model::problem::ProblemBuilder;

    fn ci(i: usize) -> ControlIndex {
        ControlIndex::new(i)
    }

    fn collect(problem: &Problem<f64>, node: &SearchNode<f64>) -> Vec<(usize, f64)> {
        let mut out = Vec::new();
        for_each_determined(problem, node, |c, v| out.push((c.get(), v)));
        out
    }

    #[test]
    fn test_nothing_determined_with_open_budgets() {
        let problem = ProblemBuilder::new(vec![0.0, 1.0, 2.0], vec![vec![0.5, 0.5], vec![0.5, 0.5]])
            .build()
            .unwrap();
        let root = SearchNode::root(&problem, 0);
        assert!(collect(&problem, &root).is_empty());
    }

    #[test]
    fn test_frozen_active_control_determines_all() {
        let mut builder =
            ProblemBuilder::new(vec![0.0, 1.0, 2.0, 3.0], vec![vec![0.5; 3], vec![0.5; 3]]);
        builder.set_max_switches(vec![0, 0]);
        let problem = builder.build().unwrap();

        let mut arena = PathArena::new();
        let evaluator = MaxNormEvaluator::new();
        let root = SearchNode::root(&problem, 0);
        let path = arena.push(None, ci(0)).unwrap();
        let node = root.extend(&problem, &evaluator, ci(0), 1, path);

        // acc after one interval: [-0.5, 0.5]; the rest of the horizon is 2.0.
        assert_eq!(collect(&problem, &node), vec![(0, -1.5), (1, 1.5)]);
    }

    #[test]
    fn test_margin_lowers_value() {
        assert!(with_margin(1.0f64) < 1.0);
        assert!(with_margin(0.0f64) < 0.0);
        assert!(with_margin(1.0f64) > 1.0 - 1e-8);
    }
}
