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

use crate::node::SearchNode;
use cia_model::{norm::CiaNorm, num::SolverFloat, problem::Problem};

/// A strategy for bounding the approximation objective of a partial assignment.
///
/// The engine calls:
/// - `bound` whenever a child is created, passing the parent's bound and the
///   child's freshly accumulated deviations for the new interval,
/// - `lookahead` to tighten pruning when some controls can no longer switch.
///
/// Implementations must be monotone: `bound` never returns less than
/// `parent_bound`. At a leaf, the chain of `bound` calls must yield exactly
/// the value `cia_model::objective::evaluate` computes.
pub trait BoundEvaluator<T>
where
    T: SolverFloat,
{
    /// Returns the name of the evaluator.
    fn name(&self) -> &str;

    /// Returns the norm this evaluator bounds.
    fn norm(&self) -> CiaNorm;

    /// Computes the bound of a child from its parent's bound.
    ///
    /// `deviations` holds `acc_i[j]` for the newly assigned interval `j`.
    /// `row_sums` holds the running `Σ_{k < j} |acc_i[k]|` of the parent and
    /// may be updated in place by evaluators that need it.
    fn bound(&self, parent_bound: T, deviations: &[T], row_sums: &mut [T]) -> T;

    /// Returns a lower bound on `eta` for any completion of `node` that is
    /// at least as strong as the node's own bound.
    ///
    /// The default adds nothing beyond the node's bound.
    fn lookahead(&self, problem: &Problem<T>, node: &SearchNode<T>) -> T {
        let _ = problem;
        node.bound()
    }
}

impl<T> std::fmt::Debug for dyn BoundEvaluator<T>
where
    T: SolverFloat,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BoundEvaluator({})", self.name())
    }
}

impl<T> std::fmt::Display for dyn BoundEvaluator<T>
where
    T: SolverFloat,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BoundEvaluator({})", self.name())
    }
}
