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

//! Independent feasibility check for complete trajectories.
//!
//! Works on maximal runs of the finished trajectory instead of incremental
//! per-node counters, so it can serve as an oracle for the search engine's
//! constraint checker and as the gate for warm-start trajectories.
//!
//! Semantics:
//! - A switch is a change of state of a control across a boundary. The
//!   boundary into interval 0 only counts when a pre-state is defined. A
//!   change from `a` to `b` counts once for `a` and once for `b`.
//! - A run that ends inside the horizon must satisfy `min_up_time`, unless it
//!   continues the pre-state. Runs touching the horizon end are exempt.
//! - An off-gap of a control that was active before (possibly as pre-state)
//!   and that ends inside the horizon must satisfy `min_down_time`.
//! - Every run, counted from `t_0` when continuing the pre-state, must satisfy
//!   `max_up_time`; the total active time must satisfy `total_max_up_time`.

use crate::{
    error::ConfigurationError,
    index::{ControlIndex, IntervalIndex},
    num::SolverFloat,
    problem::Problem,
    trajectory::BinaryTrajectory,
};
use thiserror::Error;

/// The kind of constraint a partial or complete trajectory violates.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ConstraintKind {
    /// `b_valid` forbids the control in the interval.
    Validity,
    /// `b_adjacencies` forbids the transition.
    Adjacency,
    /// The run of the deactivated control is too short.
    MinUpTime,
    /// The activated control was switched off too recently.
    MinDownTime,
    /// A control exceeds its switch budget.
    SwitchBudget,
    /// A continuous run is too long.
    MaxUpTime,
    /// The cumulative active time is too long.
    TotalMaxUpTime,
}

impl std::fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConstraintKind::Validity => "Validity",
            ConstraintKind::Adjacency => "Adjacency",
            ConstraintKind::MinUpTime => "MinUpTime",
            ConstraintKind::MinDownTime => "MinDownTime",
            ConstraintKind::SwitchBudget => "SwitchBudget",
            ConstraintKind::MaxUpTime => "MaxUpTime",
            ConstraintKind::TotalMaxUpTime => "TotalMaxUpTime",
        };
        f.write_str(name)
    }
}

/// The first constraint violation found in a trajectory.
#[derive(Error, Clone, Copy, PartialEq, Eq, Debug)]
#[error("{kind} constraint of {control} violated at {interval}")]
pub struct Violation {
    pub kind: ConstraintKind,
    pub control: ControlIndex,
    pub interval: IntervalIndex,
}

impl Violation {
    #[inline]
    fn new(kind: ConstraintKind, control: ControlIndex, interval: usize) -> Self {
        Self {
            kind,
            control,
            interval: IntervalIndex::new(interval),
        }
    }
}

/// Checks that a trajectory has the problem's dimensions.
pub fn check_dimensions<T>(
    problem: &Problem<T>,
    trajectory: &BinaryTrajectory,
) -> Result<(), ConfigurationError>
where
    T: SolverFloat,
{
    let expected = (problem.num_controls(), problem.num_intervals());
    let actual = (trajectory.num_controls(), trajectory.num_intervals());
    if expected != actual {
        return Err(ConfigurationError::shape(
            "b_bin",
            format!("{} x {}", expected.0, expected.1),
            format!("{} x {}", actual.0, actual.1),
        ));
    }
    Ok(())
}

/// Validates a complete trajectory against every constraint of the problem.
///
/// # Panics
///
/// Panics if the dimensions do not match; call [`check_dimensions`] first
/// for untrusted input.
pub fn validate<T>(problem: &Problem<T>, trajectory: &BinaryTrajectory) -> Result<(), Violation>
where
    T: SolverFloat,
{
    assert!(
        check_dimensions(problem, trajectory).is_ok(),
        "called `validation::validate` with a trajectory of different dimensions"
    );

    check_validity(problem, trajectory)?;
    check_adjacency(problem, trajectory)?;
    check_switch_budget(problem, trajectory)?;
    check_runs(problem, trajectory)?;
    check_down_times(problem, trajectory)?;
    check_total_up_times(problem, trajectory)
}

fn check_validity<T>(problem: &Problem<T>, trajectory: &BinaryTrajectory) -> Result<(), Violation>
where
    T: SolverFloat,
{
    for j in problem.intervals() {
        let control = trajectory.active_control(j);
        if !problem.is_valid(control, j) {
            return Err(Violation::new(ConstraintKind::Validity, control, j.get()));
        }
    }
    Ok(())
}

fn check_adjacency<T>(problem: &Problem<T>, trajectory: &BinaryTrajectory) -> Result<(), Violation>
where
    T: SolverFloat,
{
    let mut previous = problem.pre_state();
    for (j, &control) in trajectory.active_controls().iter().enumerate() {
        if let Some(prev) = previous
            && !problem.is_adjacent(prev, control)
        {
            return Err(Violation::new(ConstraintKind::Adjacency, control, j));
        }
        previous = Some(control);
    }
    Ok(())
}

fn check_switch_budget<T>(
    problem: &Problem<T>,
    trajectory: &BinaryTrajectory,
) -> Result<(), Violation>
where
    T: SolverFloat,
{
    let mut counts = vec![0u32; problem.num_controls()];
    let mut previous = problem.pre_state();
    for (j, &control) in trajectory.active_controls().iter().enumerate() {
        if let Some(prev) = previous
            && prev != control
        {
            for c in [prev, control] {
                counts[c.get()] += 1;
                if counts[c.get()] > problem.max_switches(c) {
                    return Err(Violation::new(ConstraintKind::SwitchBudget, c, j));
                }
            }
        }
        previous = Some(control);
    }
    Ok(())
}

fn check_runs<T>(problem: &Problem<T>, trajectory: &BinaryTrajectory) -> Result<(), Violation>
where
    T: SolverFloat,
{
    let tolerance = problem.dwell_tolerance();
    let durations = problem.interval_durations();
    let active = trajectory.active_controls();
    let num_intervals = active.len();

    let mut start = 0;
    while start < num_intervals {
        let control = active[start];
        let mut end = start;
        let mut duration = T::zero();
        while end < num_intervals && active[end] == control {
            duration = duration + durations[end];
            end += 1;
        }

        if duration > problem.max_up_time(control) + tolerance {
            return Err(Violation::new(ConstraintKind::MaxUpTime, control, start));
        }

        let continues_pre_state = start == 0 && problem.pre_state() == Some(control);
        if end < num_intervals
            && !continues_pre_state
            && duration < problem.min_up_time(control) - tolerance
        {
            return Err(Violation::new(ConstraintKind::MinUpTime, control, end));
        }

        start = end;
    }
    Ok(())
}

fn check_down_times<T>(problem: &Problem<T>, trajectory: &BinaryTrajectory) -> Result<(), Violation>
where
    T: SolverFloat,
{
    let tolerance = problem.dwell_tolerance();
    let durations = problem.interval_durations();

    for control in problem.controls() {
        // Idle time since the last deactivation, if the control was ever active.
        let mut idle: Option<T> = None;
        let mut was_active = problem.pre_state() == Some(control);

        for (j, &active) in trajectory.active_controls().iter().enumerate() {
            let is_active = active == control;
            match (was_active, is_active) {
                (true, false) => idle = Some(durations[j]),
                (false, false) => idle = idle.map(|t| t + durations[j]),
                (false, true) => {
                    if let Some(t) = idle
                        && t < problem.min_down_time(control) - tolerance
                    {
                        return Err(Violation::new(ConstraintKind::MinDownTime, control, j));
                    }
                    idle = None;
                }
                (true, true) => {}
            }
            was_active = is_active;
        }
    }
    Ok(())
}

fn check_total_up_times<T>(
    problem: &Problem<T>,
    trajectory: &BinaryTrajectory,
) -> Result<(), Violation>
where
    T: SolverFloat,
{
    let tolerance = problem.dwell_tolerance();
    let mut totals = vec![T::zero(); problem.num_controls()];
    for (j, &control) in trajectory.active_controls().iter().enumerate() {
        let total = totals[control.get()] + problem.interval_durations()[j];
        if total > problem.total_max_up_time(control) + tolerance {
            return Err(Violation::new(ConstraintKind::TotalMaxUpTime, control, j));
        }
        totals[control.get()] = total;
    }
    Ok(())
}
