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

//! # Branch-and-Bound Solver Facade
//!
//! `CiaBnbSolver` turns a `BnbOptions` value into a configured search: it
//! assembles the monitor stack, applies the warm start, runs the
//! `cia_bnb::bnb::BnbSolver` engine and remembers the status of the last run.
//!
//! ## Monitor stack
//!
//! Monitors are consulted in this order, the first one asking to terminate
//! wins:
//!
//! 1. `IterationLimitMonitor` with `max_iter`.
//! 2. `TimeLimitMonitor` with `max_cpu_time` (wall clock).
//! 3. `InterruptMonitor` on the cancel flag, if one is attached.
//! 4. `LogTreeSearchMonitor` when `verbosity > 0`.
//! 5. `VbcTraceMonitor` when a trace path is set. A trace file that cannot
//!    be created is logged and skipped.
//!
//! ## Usage
//!
//! ```rust
//! use cia_model::problem::ProblemBuilder;
//! use cia_solver::options::BnbOptions;
//! use cia_solver::solver::{BinaryApproximationSolver, CiaBnbSolver};
//!
//! let problem = ProblemBuilder::new(
//!     vec![0.0, 1.0, 2.0],
//!     vec![vec![0.75, 0.25], vec![0.25, 0.75]],
//! )
//! .build()
//! .unwrap();
//!
//! let mut solver = CiaBnbSolver::new(BnbOptions::default()).unwrap();
//! let report = solver.solve(&problem).unwrap();
//! assert!(report.status().is_proven());
//! assert_eq!(report.b_bin().unwrap(), vec![vec![1, 0], vec![0, 1]]);
//! ```

use crate::options::BnbOptions;
use cia_bnb::{
    bnb::BnbSolver,
    error::BnbError,
    monitor::{
        composite::CompositeTreeSearchMonitor, interrupt::InterruptMonitor,
        iteration_limit::IterationLimitMonitor, log::LogTreeSearchMonitor,
        time_limit::TimeLimitMonitor, vbc::VbcTraceMonitor,
    },
    result::{BnbSolverOutcome, SolverStatus},
    stats::BnbSolverStatistics,
};
use cia_model::{
    error::ConfigurationError, num::SolverFloat, problem::Problem,
    trajectory::BinaryTrajectory,
};
use log::{debug, warn};
use std::sync::{Arc, atomic::AtomicBool};

/// The result of a solve as seen by callers of a `BinaryApproximationSolver`.
#[derive(Debug, Clone)]
pub struct SolveReport<T> {
    status: SolverStatus,
    trajectory: Option<BinaryTrajectory>,
    eta: Option<T>,
    statistics: BnbSolverStatistics<T>,
}

impl<T> SolveReport<T>
where
    T: SolverFloat,
{
    #[inline]
    pub fn status(&self) -> SolverStatus {
        self.status
    }

    #[inline]
    pub fn trajectory(&self) -> Option<&BinaryTrajectory> {
        self.trajectory.as_ref()
    }

    /// Returns the `n_c × n_t` 0/1 matrix of the best trajectory found.
    #[inline]
    pub fn b_bin(&self) -> Option<Vec<Vec<u8>>> {
        self.trajectory.as_ref().map(BinaryTrajectory::to_matrix)
    }

    /// Returns the objective of the best trajectory found.
    #[inline]
    pub fn eta(&self) -> Option<T> {
        self.eta
    }

    #[inline]
    pub fn statistics(&self) -> &BnbSolverStatistics<T> {
        &self.statistics
    }

    #[inline]
    pub fn is_optimal(&self) -> bool {
        self.status == SolverStatus::Optimal
    }
}

impl<T> From<BnbSolverOutcome<T>> for SolveReport<T>
where
    T: SolverFloat,
{
    fn from(outcome: BnbSolverOutcome<T>) -> Self {
        let (status, incumbent, statistics) = outcome.into_parts();
        let (eta, trajectory) = match incumbent {
            Some(incumbent) => (Some(incumbent.objective()), Some(incumbent.into_trajectory())),
            None => (None, None),
        };
        Self {
            status,
            trajectory,
            eta,
            statistics,
        }
    }
}

impl<T> std::fmt::Display for SolveReport<T>
where
    T: SolverFloat,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.eta {
            Some(eta) => write!(f, "{} (eta = {})", self.status, eta),
            None => write!(f, "{}", self.status),
        }
    }
}

/// The capability shared by all binary approximation solvers.
pub trait BinaryApproximationSolver<T>
where
    T: SolverFloat,
{
    /// Returns the name of the solver.
    fn name(&self) -> &str;

    /// Returns the status of the last solve, `Initialized` before the first.
    fn status(&self) -> SolverStatus;

    /// Approximates the relaxed controls of `problem` by a binary trajectory.
    ///
    /// Budget stops, interrupts and infeasibility are reported through the
    /// status of the report.
    ///
    /// # Errors
    ///
    /// Returns `BnbError::Configuration` for invalid options or inputs and
    /// `BnbError::Internal` if the search detects an inconsistency.
    fn solve(&mut self, problem: &Problem<T>) -> Result<SolveReport<T>, BnbError>;
}

/// A `BinaryApproximationSolver` backed by the branch-and-bound engine.
#[derive(Debug)]
pub struct CiaBnbSolver<T> {
    options: BnbOptions,
    engine: BnbSolver<T>,
    cancel: Option<Arc<AtomicBool>>,
    warm_start: Option<BinaryTrajectory>,
    status: SolverStatus,
}

impl<T> CiaBnbSolver<T>
where
    T: SolverFloat,
{
    /// Creates a solver with validated `options`.
    ///
    /// # Errors
    ///
    /// Returns the `ConfigurationError` reported by `BnbOptions::validate`.
    pub fn new(options: BnbOptions) -> Result<Self, ConfigurationError> {
        options.validate()?;
        Ok(Self {
            options,
            engine: BnbSolver::new(),
            cancel: None,
            warm_start: None,
            status: SolverStatus::Initialized,
        })
    }

    /// Attaches a flag that stops the search once raised.
    #[inline]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    #[inline]
    pub fn cancel_flag(&self) -> Option<&Arc<AtomicBool>> {
        self.cancel.as_ref()
    }

    /// Sets the trajectory used as initial incumbent when `use_warm_start` is enabled.
    #[inline]
    pub fn set_warm_start(&mut self, trajectory: Option<BinaryTrajectory>) {
        self.warm_start = trajectory;
    }

    #[inline]
    pub fn warm_start(&self) -> Option<&BinaryTrajectory> {
        self.warm_start.as_ref()
    }

    #[inline]
    pub fn options(&self) -> &BnbOptions {
        &self.options
    }

    /// Replaces the options.
    ///
    /// # Errors
    ///
    /// Returns the `ConfigurationError` reported by `BnbOptions::validate`;
    /// the previous options stay in place.
    pub fn set_options(&mut self, options: BnbOptions) -> Result<(), ConfigurationError> {
        options.validate()?;
        self.options = options;
        Ok(())
    }

    /// Sets a single option by key, see `BnbOptions::set_option`.
    ///
    /// # Errors
    ///
    /// Returns the `ConfigurationError` for an unknown key or a bad value.
    #[inline]
    pub fn set_option(&mut self, name: &str, value: &str) -> Result<(), ConfigurationError> {
        self.options.set_option(name, value)
    }
}

impl<T> BinaryApproximationSolver<T> for CiaBnbSolver<T>
where
    T: SolverFloat,
{
    fn name(&self) -> &str {
        "CiaBnbSolver"
    }

    fn status(&self) -> SolverStatus {
        self.status
    }

    fn solve(&mut self, problem: &Problem<T>) -> Result<SolveReport<T>, BnbError> {
        self.options.validate()?;
        let options = &self.options;

        let mut monitor = CompositeTreeSearchMonitor::with_capacity(5);
        monitor.add_monitor(IterationLimitMonitor::new(options.max_iterations()));
        monitor.add_monitor(TimeLimitMonitor::new(options.max_cpu_time()));
        if let Some(flag) = &self.cancel {
            monitor.add_monitor(InterruptMonitor::new(flag));
        }
        if options.verbosity() > 0 {
            monitor.add_monitor(LogTreeSearchMonitor::new(
                options.verbosity(),
                options.log_interval(),
            ));
        }
        if let Some(path) = options.trace_path() {
            match VbcTraceMonitor::create(path, options.trace_timing()) {
                Ok(trace) => {
                    monitor.add_monitor(trace.with_dilation(options.trace_dilation()));
                }
                Err(err) => warn!(
                    "Cannot create VBC trace file {}: {}",
                    path.display(),
                    err
                ),
            }
        }

        let warm_start = if options.use_warm_start() {
            if self.warm_start.is_none() {
                debug!("Warm start enabled but no trajectory was provided");
            }
            self.warm_start.as_ref()
        } else {
            None
        };

        let outcome = self.engine.solve_with_warm_start(
            problem,
            options.strategy(),
            warm_start,
            &mut monitor,
        )?;
        self.status = outcome.status();
        Ok(outcome.into())
    }
}
