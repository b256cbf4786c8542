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

use crate::{
    monitor::tree_search_monitor::{SearchCommand, TreeSearchMonitor},
    result::{SolverStatus, StopReason},
    stats::BnbSolverStatistics,
};
use cia_model::{num::SolverFloat, problem::Problem, trajectory::BinaryTrajectory};
use std::sync::atomic::{AtomicBool, Ordering};

/// A monitor that stops the search once an atomic flag is raised.
///
/// Cancellation is cooperative: the flag is polled at the top of every
/// iteration and the search returns its incumbent with
/// `SolverStatus::UserInterrupt`.
#[derive(Debug, Clone, Copy)]
pub struct InterruptMonitor<'a> {
    stop_flag: &'a AtomicBool,
}

impl<'a> InterruptMonitor<'a> {
    #[inline]
    pub fn new(stop_flag: &'a AtomicBool) -> Self {
        Self { stop_flag }
    }
}

impl<'a, T> TreeSearchMonitor<T> for InterruptMonitor<'a>
where
    T: SolverFloat,
{
    fn name(&self) -> &str {
        "InterruptMonitor"
    }

    fn on_enter_search(&mut self, _problem: &Problem<T>, _statistics: &BnbSolverStatistics<T>) {}

    fn on_exit_search(&mut self, _status: SolverStatus, _statistics: &BnbSolverStatistics<T>) {}

    fn search_command(&mut self, _statistics: &BnbSolverStatistics<T>) -> SearchCommand {
        if self.stop_flag.load(Ordering::Relaxed) {
            SearchCommand::Terminate(StopReason::UserInterrupt)
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
