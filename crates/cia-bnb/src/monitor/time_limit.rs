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

//! Time limit monitor for tree search
//!
//! `TimeLimitMonitor` enforces a wall-clock budget. It resets its clock when
//! the search starts and compares the elapsed time against the limit on
//! masked iteration counts, trading check frequency against throughput. The
//! very first poll always reads the clock, so a zero budget stops the search
//! before any node is expanded.

use crate::{
    monitor::tree_search_monitor::{SearchCommand, TreeSearchMonitor},
    result::{SolverStatus, StopReason},
    stats::BnbSolverStatistics,
};
use cia_model::{num::SolverFloat, problem::Problem, trajectory::BinaryTrajectory};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeLimitMonitor {
    start_time: Instant,
    time_limit: Duration,
    clock_check_mask: u64,
}

impl TimeLimitMonitor {
    /// Checks the clock every 256 iterations.
    pub const DEFAULT_CLOCK_CHECK_MASK: u64 = 0xFF;

    pub fn new(time_limit: Duration) -> Self {
        Self::with_clock_check_mask(time_limit, Self::DEFAULT_CLOCK_CHECK_MASK)
    }

    /// Creates a monitor that reads the clock whenever `iterations & mask == 0`.
    pub fn with_clock_check_mask(time_limit: Duration, mask: u64) -> Self {
        Self {
            start_time: Instant::now(),
            time_limit,
            clock_check_mask: mask,
        }
    }

    #[inline]
    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }
}

impl<T> TreeSearchMonitor<T> for TimeLimitMonitor
where
    T: SolverFloat,
{
    fn name(&self) -> &str {
        "TimeLimitMonitor"
    }

    fn on_enter_search(&mut self, _problem: &Problem<T>, _statistics: &BnbSolverStatistics<T>) {
        self.start_time = Instant::now();
    }

    fn on_exit_search(&mut self, _status: SolverStatus, _statistics: &BnbSolverStatistics<T>) {}

    fn search_command(&mut self, statistics: &BnbSolverStatistics<T>) -> SearchCommand {
        if (statistics.iterations & self.clock_check_mask) == 0
            && self.start_time.elapsed() >= self.time_limit
        {
            return SearchCommand::Terminate(StopReason::TimeLimit {
                limit: self.time_limit,
            });
        }
        SearchCommand::Continue
    }

    fn on_solution_found(
        &mut self,
        _trajectory: &BinaryTrajectory,
        _objective: T,
        _statistics: &BnbSolverStatistics<T>,
    ) {
    }
}
