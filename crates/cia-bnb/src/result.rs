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

use crate::{incumbent::Incumbent, stats::BnbSolverStatistics};
use cia_model::{num::SolverFloat, trajectory::BinaryTrajectory};
use std::time::Duration;

/// Exit status of a search.
///
/// Budget stops and interrupts are statuses, not errors: the best incumbent
/// found so far is returned alongside them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum SolverStatus {
    /// No search has been run yet.
    #[default]
    Initialized,
    /// The frontier was exhausted with an incumbent; it is optimal.
    Optimal,
    /// The iteration budget was reached.
    IterationLimitExceeded,
    /// The time budget was reached.
    TimeLimitExceeded,
    /// Cooperative cancellation was observed.
    UserInterrupt,
    /// The frontier was exhausted without any feasible leaf.
    Infeasible,
}

impl SolverStatus {
    /// Returns the human readable status message.
    pub const fn message(&self) -> &'static str {
        match self {
            SolverStatus::Initialized => "Initialized",
            SolverStatus::Optimal => "Optimal solution found",
            SolverStatus::IterationLimitExceeded => "Maximum number of iterations exceeded",
            SolverStatus::TimeLimitExceeded => "Maximum CPU time exceeded",
            SolverStatus::UserInterrupt => "User interrupt",
            SolverStatus::Infeasible => "Problem is infeasible",
        }
    }

    /// Returns `true` for the statuses that end a completed search.
    #[inline]
    pub const fn is_proven(&self) -> bool {
        matches!(self, SolverStatus::Optimal | SolverStatus::Infeasible)
    }

    /// Returns `true` if the search stopped early because of a budget or an interrupt.
    #[inline]
    pub const fn is_aborted(&self) -> bool {
        matches!(
            self,
            SolverStatus::IterationLimitExceeded
                | SolverStatus::TimeLimitExceeded
                | SolverStatus::UserInterrupt
        )
    }
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Why a monitor asked the search to stop.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum StopReason {
    IterationLimit { limit: u64 },
    TimeLimit { limit: Duration },
    UserInterrupt,
}

impl From<StopReason> for SolverStatus {
    fn from(reason: StopReason) -> Self {
        match reason {
            StopReason::IterationLimit { .. } => SolverStatus::IterationLimitExceeded,
            StopReason::TimeLimit { .. } => SolverStatus::TimeLimitExceeded,
            StopReason::UserInterrupt => SolverStatus::UserInterrupt,
        }
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::IterationLimit { limit } => write!(f, "iteration limit of {} reached", limit),
            StopReason::TimeLimit { limit } => write!(f, "time limit of {:.2?} reached", limit),
            StopReason::UserInterrupt => f.write_str("interrupted by user"),
        }
    }
}

/// Result of the solver after termination.
#[derive(Debug, Clone)]
pub struct BnbSolverOutcome<T> {
    status: SolverStatus,
    incumbent: Option<Incumbent<T>>,
    statistics: BnbSolverStatistics<T>,
}

impl<T> BnbSolverOutcome<T>
where
    T: SolverFloat,
{
    #[inline]
    pub fn optimal(incumbent: Incumbent<T>, statistics: BnbSolverStatistics<T>) -> Self {
        Self {
            status: SolverStatus::Optimal,
            incumbent: Some(incumbent),
            statistics,
        }
    }

    #[inline]
    pub fn infeasible(statistics: BnbSolverStatistics<T>) -> Self {
        Self {
            status: SolverStatus::Infeasible,
            incumbent: None,
            statistics,
        }
    }

    #[inline]
    pub fn aborted(
        incumbent: Option<Incumbent<T>>,
        reason: StopReason,
        statistics: BnbSolverStatistics<T>,
    ) -> Self {
        Self {
            status: reason.into(),
            incumbent,
            statistics,
        }
    }

    #[inline]
    pub fn status(&self) -> SolverStatus {
        self.status
    }

    #[inline]
    pub fn incumbent(&self) -> Option<&Incumbent<T>> {
        self.incumbent.as_ref()
    }

    /// Returns the best trajectory found, if any.
    #[inline]
    pub fn trajectory(&self) -> Option<&BinaryTrajectory> {
        self.incumbent.as_ref().map(Incumbent::trajectory)
    }

    /// Returns the objective of the best trajectory, if any.
    #[inline]
    pub fn objective(&self) -> Option<T> {
        self.incumbent.as_ref().map(Incumbent::objective)
    }

    /// Returns the best trajectory as an `n_c × n_t` 0/1 matrix, if any.
    pub fn b_bin(&self) -> Option<Vec<Vec<u8>>> {
        self.trajectory().map(BinaryTrajectory::to_matrix)
    }

    #[inline]
    pub fn statistics(&self) -> &BnbSolverStatistics<T> {
        &self.statistics
    }

    #[inline]
    pub fn into_parts(self) -> (SolverStatus, Option<Incumbent<T>>, BnbSolverStatistics<T>) {
        (self.status, self.incumbent, self.statistics)
    }
}

impl<T> std::fmt::Display for BnbSolverOutcome<T>
where
    T: SolverFloat,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.objective() {
            Some(eta) => write!(f, "{} (eta = {})", self.status, eta),
            None => write!(f, "{}", self.status),
        }
    }
}
