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

//! Incremental constraint checking.
//!
//! `ConstraintChecker` decides whether a control may be active in the next
//! interval of a node, using only the node's counters. The checks are
//! evaluated in a fixed order and the first failing one is reported:
//!
//! 1. validity (`b_valid`),
//! 2. adjacency from the last active control (or the pre-state at depth 0),
//! 3. for a switch away from the last active control: its minimum up time,
//!    the switch budgets of both controls, and the minimum down time of the
//!    candidate,
//! 4. the maximum up time of the run the candidate would extend or start,
//! 5. the total up time of the candidate.
//!
//! A prefix accepted interval by interval is exactly a prefix of a trajectory
//! accepted by `cia_model::validation::validate`.

use crate::node::SearchNode;
use cia_model::{
    index::{ControlIndex, IntervalIndex},
    num::SolverFloat,
    problem::Problem,
    validation::ConstraintKind,
};

#[derive(Debug, Clone, Copy)]
pub struct ConstraintChecker<'a, T> {
    problem: &'a Problem<T>,
    tolerance: T,
}

impl<'a, T> ConstraintChecker<'a, T>
where
    T: SolverFloat,
{
    #[inline]
    pub fn new(problem: &'a Problem<T>) -> Self {
        Self {
            problem,
            tolerance: problem.dwell_tolerance(),
        }
    }

    #[inline]
    pub fn problem(&self) -> &'a Problem<T> {
        self.problem
    }

    /// Returns `true` if `candidate` may be active in the next interval of `node`.
    #[inline]
    pub fn is_feasible(&self, node: &SearchNode<T>, candidate: ControlIndex) -> bool {
        self.check(node, candidate).is_ok()
    }

    /// Checks `candidate` for the interval `node.depth()`.
    ///
    /// # Errors
    ///
    /// Returns the kind of the first violated constraint.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `node` is a leaf.
    pub fn check(&self, node: &SearchNode<T>, candidate: ControlIndex) -> Result<(), ConstraintKind> {
        let problem = self.problem;
        debug_assert!(
            node.depth() < problem.num_intervals(),
            "called `ConstraintChecker::check` on a leaf"
        );

        let interval = IntervalIndex::new(node.depth());
        let duration = problem.interval_duration(interval);

        if !problem.is_valid(candidate, interval) {
            return Err(ConstraintKind::Validity);
        }

        let run = match node.last_active() {
            Some(last) => {
                if !problem.is_adjacent(last, candidate) {
                    return Err(ConstraintKind::Adjacency);
                }
                if last == candidate {
                    node.run_duration() + duration
                } else {
                    self.check_switch(node, last, candidate)?;
                    duration
                }
            }
            None => duration,
        };

        if run > problem.max_up_time(candidate) + self.tolerance {
            return Err(ConstraintKind::MaxUpTime);
        }
        if node.up_time(candidate) + duration > problem.total_max_up_time(candidate) + self.tolerance
        {
            return Err(ConstraintKind::TotalMaxUpTime);
        }
        Ok(())
    }

    fn check_switch(
        &self,
        node: &SearchNode<T>,
        last: ControlIndex,
        candidate: ControlIndex,
    ) -> Result<(), ConstraintKind> {
        let problem = self.problem;

        if !node.run_exempt() && node.run_duration() < problem.min_up_time(last) - self.tolerance {
            return Err(ConstraintKind::MinUpTime);
        }
        if node.switches(last) >= problem.max_switches(last)
            || node.switches(candidate) >= problem.max_switches(candidate)
        {
            return Err(ConstraintKind::SwitchBudget);
        }
        if let Some(idle) = node.idle_time(candidate)
            && idle < problem.min_down_time(candidate) - self.tolerance
        {
            return Err(ConstraintKind::MinDownTime);
        }
        Ok(())
    }
}
