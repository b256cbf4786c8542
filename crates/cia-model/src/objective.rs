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

//! Direct evaluation of the approximation objective `eta`.
//!
//! The accumulated deviation of control `i` after interval `j` is
//! `acc[i][j] = Σ_{k ≤ j} dt[k] · (b_rel[i][k] − b_bin[i][k])`. The functions
//! here recompute it from scratch for a complete trajectory. They accumulate
//! in interval order with [`deviation_step`], the same step the search engine
//! applies incrementally, so both paths produce bit-identical values.

use crate::{
    index::{ControlIndex, IntervalIndex},
    norm::CiaNorm,
    num::SolverFloat,
    problem::Problem,
    trajectory::BinaryTrajectory,
};

/// Advances an accumulated deviation by one interval.
#[inline(always)]
pub fn deviation_step<T>(accumulated: T, duration: T, relaxed: T, active: bool) -> T
where
    T: SolverFloat,
{
    let binary = if active { T::one() } else { T::zero() };
    accumulated + duration * (relaxed - binary)
}

/// Returns the accumulated deviation matrix `acc[i][j]`.
///
/// # Panics
///
/// Panics if the trajectory does not have the problem's dimensions.
pub fn deviations<T>(problem: &Problem<T>, trajectory: &BinaryTrajectory) -> Vec<Vec<T>>
where
    T: SolverFloat,
{
    assert_eq!(
        (trajectory.num_controls(), trajectory.num_intervals()),
        (problem.num_controls(), problem.num_intervals()),
        "called `objective::deviations` with a trajectory of different dimensions"
    );

    let num_intervals = problem.num_intervals();
    problem
        .controls()
        .map(|c| {
            let mut row = Vec::with_capacity(num_intervals);
            let mut acc = T::zero();
            for j in problem.intervals() {
                acc = deviation_step(
                    acc,
                    problem.interval_duration(j),
                    problem.relaxed_value(c, j),
                    trajectory.is_active(c, j),
                );
                row.push(acc);
            }
            row
        })
        .collect()
}

/// Recomputes `eta` for the problem's norm.
///
/// # Panics
///
/// Panics if the trajectory does not have the problem's dimensions.
pub fn evaluate<T>(problem: &Problem<T>, trajectory: &BinaryTrajectory) -> T
where
    T: SolverFloat,
{
    evaluate_with_norm(problem, trajectory, problem.norm())
}

/// Recomputes `eta` for an explicit norm.
///
/// # Panics
///
/// Panics if the trajectory does not have the problem's dimensions.
pub fn evaluate_with_norm<T>(problem: &Problem<T>, trajectory: &BinaryTrajectory, norm: CiaNorm) -> T
where
    T: SolverFloat,
{
    let acc = deviations(problem, trajectory);
    let num_controls = problem.num_controls();

    match norm {
        CiaNorm::MaxNorm => acc
            .iter()
            .flatten()
            .fold(T::zero(), |eta, value| eta.max(value.abs())),
        CiaNorm::ColumnSumNorm => (0..problem.num_intervals()).fold(T::zero(), |eta, j| {
            let column = (0..num_controls).fold(T::zero(), |sum, i| sum + acc[i][j].abs());
            eta.max(column)
        }),
        CiaNorm::RowSumNorm => acc.iter().fold(T::zero(), |eta, row| {
            let row_sum = row.iter().fold(T::zero(), |sum, value| sum + value.abs());
            eta.max(row_sum)
        }),
    }
}

/// Returns the accumulated deviation of one control after `interval_index`.
pub fn deviation_at<T>(
    problem: &Problem<T>,
    trajectory: &BinaryTrajectory,
    control_index: ControlIndex,
    interval_index: IntervalIndex,
) -> T
where
    T: SolverFloat,
{
    (0..=interval_index.get())
        .map(IntervalIndex::new)
        .fold(T::zero(), |acc, j| {
            deviation_step(
                acc,
                problem.interval_duration(j),
                problem.relaxed_value(control_index, j),
                trajectory.is_active(control_index, j),
            )
        })
}
