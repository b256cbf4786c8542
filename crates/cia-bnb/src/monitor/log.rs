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

//! Progress reporting through the `log` facade.
//!
//! `LogTreeSearchMonitor` writes a short problem summary when the search
//! starts, a table row for every new incumbent and, at verbosity 2 and above,
//! a progress row every `interval` iterations. The final status and the
//! statistics table close the report. No logger is installed here; the
//! application decides where the records go.

use crate::{
    monitor::tree_search_monitor::TreeSearchMonitor, result::SolverStatus,
    stats::BnbSolverStatistics,
};
use cia_model::{num::SolverFloat, problem::Problem, trajectory::BinaryTrajectory};
use log::{debug, info};
use std::time::Instant;

/// Default number of iterations between two progress rows.
pub const DEFAULT_LOG_INTERVAL: u64 = 1_000_000;

#[derive(Debug, Clone)]
pub struct LogTreeSearchMonitor<T> {
    start_time: Instant,
    interval: u64,
    verbosity: u8,
    best_objective: Option<T>,
}

impl<T> Default for LogTreeSearchMonitor<T>
where
    T: SolverFloat,
{
    fn default() -> Self {
        Self::new(1, DEFAULT_LOG_INTERVAL)
    }
}

impl<T> LogTreeSearchMonitor<T>
where
    T: SolverFloat,
{
    /// Creates a monitor; an `interval` of zero disables progress rows.
    pub fn new(verbosity: u8, interval: u64) -> Self {
        Self {
            start_time: Instant::now(),
            interval,
            verbosity,
            best_objective: None,
        }
    }

    #[inline]
    pub fn verbosity(&self) -> u8 {
        self.verbosity
    }

    #[inline]
    fn print_header(&self) {
        info!(
            "{:>12} | {:>16} | {:>12} | {:>11}",
            "Iteration", "Upper bound", "Open nodes", "Runtime (s)"
        );
        info!("{}", "-".repeat(61));
    }

    #[inline]
    fn log_line(&self, statistics: &BnbSolverStatistics<T>) {
        let upper = match self.best_objective {
            Some(value) => format!("{:.6e}", value.to_f64().unwrap_or(f64::NAN)),
            None => "inf".to_string(),
        };
        info!(
            "{:>12} | {:>16} | {:>12} | {:>11.3}",
            statistics.iterations,
            upper,
            statistics.open_nodes,
            self.start_time.elapsed().as_secs_f64()
        );
    }
}

impl<T> std::fmt::Display for LogTreeSearchMonitor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "LogTreeSearchMonitor(verbosity: {}, interval: {})",
            self.verbosity, self.interval
        )
    }
}

impl<T> TreeSearchMonitor<T> for LogTreeSearchMonitor<T>
where
    T: SolverFloat,
{
    fn name(&self) -> &str {
        "LogTreeSearchMonitor"
    }

    fn on_enter_search(&mut self, problem: &Problem<T>, statistics: &BnbSolverStatistics<T>) {
        self.start_time = Instant::now();
        // A warm start is already an upper bound.
        self.best_objective = statistics.incumbent_objective;

        info!(
            "CIA branch-and-bound: {} controls, {} intervals, norm {}",
            problem.num_controls(),
            problem.num_intervals(),
            problem.norm()
        );
        info!(
            "Search space: 10^{:.1} trajectories",
            problem.search_space_log10()
        );
        self.print_header();
    }

    fn on_exit_search(&mut self, status: SolverStatus, statistics: &BnbSolverStatistics<T>) {
        self.log_line(statistics);
        info!("{}", "-".repeat(61));
        info!("Exit status: {}", status);
        if let Some(best) = self.best_objective {
            info!("Best objective: {}", best);
        }
        debug!("{}", statistics);
    }

    fn on_step(&mut self, statistics: &BnbSolverStatistics<T>) {
        if self.verbosity >= 2
            && self.interval > 0
            && statistics.iterations > 0
            && statistics.iterations % self.interval == 0
        {
            self.log_line(statistics);
        }
    }

    fn on_solution_found(
        &mut self,
        _trajectory: &BinaryTrajectory,
        objective: T,
        statistics: &BnbSolverStatistics<T>,
    ) {
        self.best_objective = Some(objective);
        self.log_line(statistics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cia_model::{index::ControlIndex, problem::ProblemBuilder};

    #[test]
    fn test_tracks_best_objective() {
        let problem = ProblemBuilder::new(vec![0.0, 1.0], vec![vec![1.0]]).build().unwrap();
        let mut monitor = LogTreeSearchMonitor::<f64>::new(2, 1);
        let stats = BnbSolverStatistics::default();

        monitor.on_enter_search(&problem, &stats);
        let trajectory = BinaryTrajectory::new(1, vec![ControlIndex::new(0)]).unwrap();
        monitor.on_solution_found(&trajectory, 0.25, &stats);
        assert_eq!(monitor.best_objective, Some(0.25));

        monitor.on_exit_search(SolverStatus::Optimal, &stats);
        assert_eq!(monitor.verbosity(), 2);
        assert_eq!(
            monitor.to_string(),
            "LogTreeSearchMonitor(verbosity: 2, interval: 1)"
        );
    }

    #[test]
    fn test_upper_bound_starts_at_warm_start() {
        let problem = ProblemBuilder::new(vec![0.0, 1.0], vec![vec![1.0]]).build().unwrap();
        let mut monitor = LogTreeSearchMonitor::<f64>::new(1, 0);
        let mut stats = BnbSolverStatistics::default();

        monitor.on_enter_search(&problem, &stats);
        assert_eq!(monitor.best_objective, None);

        stats.set_incumbent_objective(0.5);
        monitor.on_enter_search(&problem, &stats);
        assert_eq!(monitor.best_objective, Some(0.5));
    }
}
