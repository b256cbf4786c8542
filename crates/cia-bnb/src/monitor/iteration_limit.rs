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

//! Iteration budget.
//!
//! `IterationLimitMonitor` terminates the search once the number of node
//! pops reaches `max_iter`. The check runs before every pop, so exactly
//! `max_iter` nodes are expanded.

use crate::{
    monitor::tree_search_monitor::{SearchCommand, TreeSearchMonitor},
    result::{SolverStatus, StopReason},
    stats::BnbSolverStatistics,
};
use cia_model::{num::SolverFloat, problem::Problem, trajectory::BinaryTrajectory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationLimitMonitor {
    max_iterations: u64,
}

impl IterationLimitMonitor {
    #[inline]
    pub fn new(max_iterations: u64) -> Self {
        Self { max_iterations }
    }

    #[inline]
    pub fn max_iterations(&self) -> u64 {
        self.max_iterations
    }
}

impl<T> TreeSearchMonitor<T> for IterationLimitMonitor
where
    T: SolverFloat,
{
    fn name(&self) -> &str {
        "IterationLimitMonitor"
    }

    fn on_enter_search(&mut self, _problem: &Problem<T>, _statistics: &BnbSolverStatistics<T>) {}

    fn on_exit_search(&mut self, _status: SolverStatus, _statistics: &BnbSolverStatistics<T>) {}

    fn search_command(&mut self, statistics: &BnbSolverStatistics<T>) -> SearchCommand {
        if statistics.iterations >= self.max_iterations {
            SearchCommand::Terminate(StopReason::IterationLimit {
                limit: self.max_iterations,
            })
        } else {
            SearchCommand::Continue
        }
    }

    fn on_solution_found(
        &mut self,
        _trajectory: &BinaryTrajectory,
        _objective: T,
        _statistics: &BnbSolverStatistics<T>,
    ) {
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminates_at_limit() {
        let mut monitor = IterationLimitMonitor::new(3);
        let mut stats = BnbSolverStatistics::<f64>::default();
        stats.iterations = 2;
        assert_eq!(monitor.search_command(&stats), SearchCommand::Continue);
        stats.iterations = 3;
        assert_eq!(
            monitor.search_command(&stats),
            SearchCommand::Terminate(StopReason::IterationLimit { limit: 3 })
        );
    }

    #[test]
    fn test_zero_limit_stops_before_first_pop() {
        let mut monitor = IterationLimitMonitor::new(0);
        let stats = BnbSolverStatistics::<f64>::default();
        assert!(matches!(
            monitor.search_command(&stats),
            SearchCommand::Terminate(_)
        ));
    }
}
