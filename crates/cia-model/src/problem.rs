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

//! The immutable problem description consumed by the search engine, and the
//! builder that validates it.
//!
//! All constraint data is stored in flattened, control-major vectors so that
//! the engine's inner loop reads contiguous memory. Boolean matrices
//! (`b_valid`, `b_adjacencies`) are stored as bitsets.

use crate::{
    error::ConfigurationError,
    index::{ControlIndex, IntervalIndex},
    norm::CiaNorm,
    num::{SolverFloat, constant},
};
use fixedbitset::FixedBitSet;

/// Relative factor applied to the shortest interval to obtain the dwell tolerance.
const DWELL_TOLERANCE_FACTOR: f64 = 1e-5;
/// Slack allowed for relaxed values outside of `[0, 1]`.
const RELAXED_RANGE_TOLERANCE: f64 = 1e-9;
/// Slack allowed for relaxed columns not summing to exactly one.
const COLUMN_SUM_TOLERANCE: f64 = 1e-6;

/// A validated combinatorial integral approximation problem.
///
/// Constructed through [`ProblemBuilder`]; never mutated afterwards.
#[derive(Clone, Debug)]
pub struct Problem<T> {
    num_controls: usize,
    num_intervals: usize,
    time_points: Vec<T>,
    durations: Vec<T>,
    relaxed: Vec<T>,
    max_switches: Vec<u32>,
    min_up_times: Vec<T>,
    min_down_times: Vec<T>,
    max_up_times: Vec<T>,
    total_max_up_times: Vec<T>,
    valid: FixedBitSet,
    adjacency: FixedBitSet,
    pre_state: Option<ControlIndex>,
    norm: CiaNorm,
    horizon: T,
    dwell_tolerance: T,
    suffix_durations: Vec<T>,
    suffix_relaxed: Vec<T>,
}

impl<T> Problem<T>
where
    T: SolverFloat,
{
    /// Returns the number of binary controls `n_c`.
    #[inline]
    pub fn num_controls(&self) -> usize {
        self.num_controls
    }

    /// Returns the number of intervals `n_t`.
    #[inline]
    pub fn num_intervals(&self) -> usize {
        self.num_intervals
    }

    /// Returns the `n_t + 1` time points of the grid.
    #[inline]
    pub fn time_points(&self) -> &[T] {
        &self.time_points
    }

    /// Returns the interval durations `dt`.
    #[inline]
    pub fn interval_durations(&self) -> &[T] {
        &self.durations
    }

    /// Returns the duration of the interval `interval_index`.
    ///
    /// # Panics
    ///
    /// Panics if `interval_index` is not in `0..num_intervals()`.
    #[inline]
    pub fn interval_duration(&self, interval_index: IntervalIndex) -> T {
        let index = interval_index.get();
        debug_assert!(
            index < self.num_intervals,
            "called `Problem::interval_duration` with interval index out of bounds: the len is {} but the index is {}",
            self.num_intervals,
            index
        );

        self.durations[index]
    }

    /// Returns the relaxed value `b_rel[control][interval]`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn relaxed_value(&self, control_index: ControlIndex, interval_index: IntervalIndex) -> T {
        debug_assert!(
            control_index.get() < self.num_controls,
            "called `Problem::relaxed_value` with control index out of bounds: the len is {} but the index is {}",
            self.num_controls,
            control_index.get()
        );
        debug_assert!(
            interval_index.get() < self.num_intervals,
            "called `Problem::relaxed_value` with interval index out of bounds: the len is {} but the index is {}",
            self.num_intervals,
            interval_index.get()
        );

        self.relaxed[control_index.get() * self.num_intervals + interval_index.get()]
    }

    /// Returns the relaxed trajectory of a single control.
    #[inline]
    pub fn relaxed_row(&self, control_index: ControlIndex) -> &[T] {
        let start = control_index.get() * self.num_intervals;
        &self.relaxed[start..start + self.num_intervals]
    }

    /// Returns the switch budget of a control. `u32::MAX` means unbounded.
    #[inline]
    pub fn max_switches(&self, control_index: ControlIndex) -> u32 {
        self.max_switches[control_index.get()]
    }

    #[inline]
    pub fn min_up_time(&self, control_index: ControlIndex) -> T {
        self.min_up_times[control_index.get()]
    }

    #[inline]
    pub fn min_down_time(&self, control_index: ControlIndex) -> T {
        self.min_down_times[control_index.get()]
    }

    #[inline]
    pub fn max_up_time(&self, control_index: ControlIndex) -> T {
        self.max_up_times[control_index.get()]
    }

    #[inline]
    pub fn total_max_up_time(&self, control_index: ControlIndex) -> T {
        self.total_max_up_times[control_index.get()]
    }

    /// Returns `true` if `control_index` may be active during `interval_index`.
    #[inline]
    pub fn is_valid(&self, control_index: ControlIndex, interval_index: IntervalIndex) -> bool {
        self.valid
            .contains(control_index.get() * self.num_intervals + interval_index.get())
    }

    /// Returns `true` if a transition from `from` (active at `j - 1`) to `to`
    /// (active at `j`) is permitted.
    #[inline]
    pub fn is_adjacent(&self, from: ControlIndex, to: ControlIndex) -> bool {
        self.adjacency
            .contains(from.get() * self.num_controls + to.get())
    }

    /// Returns the control active before the horizon, if any.
    #[inline]
    pub fn pre_state(&self) -> Option<ControlIndex> {
        self.pre_state
    }

    #[inline]
    pub fn norm(&self) -> CiaNorm {
        self.norm
    }

    /// Returns the length of the horizon `t_last - t_0`.
    #[inline]
    pub fn horizon(&self) -> T {
        self.horizon
    }

    /// Returns the slack used for dwell and up-time comparisons.
    ///
    /// Minimum durations are compared against `limit - tolerance` and
    /// maximum durations against `limit + tolerance`.
    #[inline]
    pub fn dwell_tolerance(&self) -> T {
        self.dwell_tolerance
    }

    /// Returns `Σ_{m ≥ j} dt[m]`; `j == num_intervals()` yields zero.
    #[inline]
    pub fn suffix_duration(&self, interval_index: IntervalIndex) -> T {
        self.suffix_durations[interval_index.get()]
    }

    /// Returns `Σ_{m ≥ j} dt[m] · b_rel[control][m]`; `j == num_intervals()` yields zero.
    #[inline]
    pub fn suffix_relaxed(&self, control_index: ControlIndex, interval_index: IntervalIndex) -> T {
        self.suffix_relaxed[control_index.get() * (self.num_intervals + 1) + interval_index.get()]
    }

    /// Returns `log10` of the number of SOS1 trajectories, `n_t · log10(n_c)`.
    pub fn search_space_log10(&self) -> f64 {
        self.num_intervals as f64 * (self.num_controls as f64).log10()
    }

    /// Iterates over all control indices.
    #[inline]
    pub fn controls(&self) -> impl Iterator<Item = ControlIndex> + use<T> {
        ControlIndex::range(self.num_controls)
    }

    /// Iterates over all interval indices.
    #[inline]
    pub fn intervals(&self) -> impl Iterator<Item = IntervalIndex> + use<T> {
        IntervalIndex::range(self.num_intervals)
    }
}

impl<T> std::fmt::Display for Problem<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Problem(num_controls: {}, num_intervals: {}, norm: {})",
            self.num_controls, self.num_intervals, self.norm
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
enum PreStateInput {
    Unset,
    Control(ControlIndex),
    Flags(Vec<bool>),
}

/// Builder for [`Problem`].
///
/// Starts from **permissive defaults**; constraints are added by narrowing them.
///
/// | Field | Default | Semantics |
/// | :--- | :--- | :--- |
/// | `n_max_switches` | `u32::MAX` | No switch budget. |
/// | `min_up_time`, `min_down_time` | `0` | No dwell requirements. |
/// | `max_up_time`, `total_max_up_time` | `+inf` | Equivalent to the horizon length. |
/// | `b_valid` | all `true` | Every control is allowed in every interval. |
/// | `b_adjacencies` | all `true` | Every transition is allowed. |
/// | pre-state | none | Interval 0 is unconstrained by history. |
/// | norm | `max_norm` | |
///
/// Shapes are only checked in [`ProblemBuilder::build`], so a mismatch is
/// reported as a [`ConfigurationError`] rather than a panic.
///
/// # Examples
///
/// ```rust
/// use cia_model::problem::ProblemBuilder;
///
/// let mut builder = ProblemBuilder::new(
///     vec![0.0, 1.0, 2.0],
///     vec![vec![0.3, 0.8], vec![0.7, 0.2]],
/// );
/// builder.set_max_switches(vec![1, 1]);
/// let problem = builder.build().unwrap();
/// assert_eq!(problem.num_controls(), 2);
/// assert_eq!(problem.num_intervals(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct ProblemBuilder<T> {
    time_points: Vec<T>,
    relaxed: Vec<Vec<T>>,
    max_switches: Option<Vec<u32>>,
    min_up_times: Option<Vec<T>>,
    min_down_times: Option<Vec<T>>,
    max_up_times: Option<Vec<T>>,
    total_max_up_times: Option<Vec<T>>,
    valid: Option<Vec<Vec<bool>>>,
    adjacency: Option<Vec<Vec<bool>>>,
    pre_state: PreStateInput,
    norm: CiaNorm,
}

impl<T> ProblemBuilder<T>
where
    T: SolverFloat,
{
    /// Creates a builder from the time grid and the relaxed signal
    /// (`relaxed[i][j]` for control `i` and interval `j`).
    pub fn new(time_points: Vec<T>, relaxed: Vec<Vec<T>>) -> Self {
        Self {
            time_points,
            relaxed,
            max_switches: None,
            min_up_times: None,
            min_down_times: None,
            max_up_times: None,
            total_max_up_times: None,
            valid: None,
            adjacency: None,
            pre_state: PreStateInput::Unset,
            norm: CiaNorm::MaxNorm,
        }
    }

    /// Returns the number of controls implied by the relaxed signal.
    #[inline]
    pub fn num_controls(&self) -> usize {
        self.relaxed.len()
    }

    /// Returns the number of intervals implied by the time grid.
    #[inline]
    pub fn num_intervals(&self) -> usize {
        self.time_points.len().saturating_sub(1)
    }

    #[inline]
    pub fn set_max_switches(&mut self, max_switches: Vec<u32>) -> &mut Self {
        self.max_switches = Some(max_switches);
        self
    }

    #[inline]
    pub fn set_min_up_times(&mut self, min_up_times: Vec<T>) -> &mut Self {
        self.min_up_times = Some(min_up_times);
        self
    }

    #[inline]
    pub fn set_min_down_times(&mut self, min_down_times: Vec<T>) -> &mut Self {
        self.min_down_times = Some(min_down_times);
        self
    }

    #[inline]
    pub fn set_max_up_times(&mut self, max_up_times: Vec<T>) -> &mut Self {
        self.max_up_times = Some(max_up_times);
        self
    }

    #[inline]
    pub fn set_total_max_up_times(&mut self, total_max_up_times: Vec<T>) -> &mut Self {
        self.total_max_up_times = Some(total_max_up_times);
        self
    }

    /// Sets `b_valid` as an `n_c × n_t` matrix.
    #[inline]
    pub fn set_valid_controls(&mut self, valid: Vec<Vec<bool>>) -> &mut Self {
        self.valid = Some(valid);
        self
    }

    /// Sets `b_adjacencies` as an `n_c × n_c` matrix; `adjacency[i][k]`
    /// permits the transition from `i` to `k`.
    #[inline]
    pub fn set_adjacencies(&mut self, adjacency: Vec<Vec<bool>>) -> &mut Self {
        self.adjacency = Some(adjacency);
        self
    }

    /// Sets the pre-horizon state to a single control, or clears it.
    #[inline]
    pub fn set_pre_state(&mut self, pre_state: Option<ControlIndex>) -> &mut Self {
        self.pre_state = match pre_state {
            Some(control) => PreStateInput::Control(control),
            None => PreStateInput::Unset,
        };
        self
    }

    /// Sets the pre-horizon state as a 0/1 flag vector with at most one flag set.
    #[inline]
    pub fn set_pre_state_flags(&mut self, flags: Vec<bool>) -> &mut Self {
        self.pre_state = PreStateInput::Flags(flags);
        self
    }

    #[inline]
    pub fn set_norm(&mut self, norm: CiaNorm) -> &mut Self {
        self.norm = norm;
        self
    }

    /// Validates the collected data and builds the immutable [`Problem`].
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] for an empty problem, a non-increasing
    /// time grid, any shape mismatch, relaxed values outside `[0, 1]` or columns
    /// not summing to one, negative or NaN durations, and an invalid pre-state.
    pub fn build(self) -> Result<Problem<T>, ConfigurationError> {
        let num_controls = self.relaxed.len();
        if num_controls == 0 {
            return Err(ConfigurationError::NoControls);
        }
        if self.time_points.len() < 2 {
            return Err(ConfigurationError::EmptyHorizon(self.time_points.len()));
        }
        let num_intervals = self.time_points.len() - 1;

        if !self.time_points[0].is_finite() {
            return Err(ConfigurationError::NonIncreasingTime { index: 0 });
        }
        let mut durations = Vec::with_capacity(num_intervals);
        for (index, pair) in self.time_points.windows(2).enumerate() {
            let dt = pair[1] - pair[0];
            if !pair[1].is_finite() || !(dt > T::zero()) || !dt.is_finite() {
                return Err(ConfigurationError::NonIncreasingTime { index: index + 1 });
            }
            durations.push(dt);
        }

        let relaxed = flatten_relaxed(&self.relaxed, num_intervals)?;
        check_relaxed_columns(&relaxed, num_controls, num_intervals)?;

        let max_switches =
            per_control("n_max_switches", self.max_switches, num_controls, u32::MAX)?;
        let min_up_times = per_control("min_up_time", self.min_up_times, num_controls, T::zero())?;
        let min_down_times =
            per_control("min_down_time", self.min_down_times, num_controls, T::zero())?;
        let max_up_times =
            per_control("max_up_time", self.max_up_times, num_controls, T::infinity())?;
        let total_max_up_times = per_control(
            "total_max_up_time",
            self.total_max_up_times,
            num_controls,
            T::infinity(),
        )?;
        check_non_negative("min_up_time", &min_up_times)?;
        check_non_negative("min_down_time", &min_down_times)?;
        check_non_negative("max_up_time", &max_up_times)?;
        check_non_negative("total_max_up_time", &total_max_up_times)?;

        let valid = bit_matrix("b_valid", self.valid, num_controls, num_intervals)?;
        let adjacency = bit_matrix("b_adjacencies", self.adjacency, num_controls, num_controls)?;
        let pre_state = resolve_pre_state(self.pre_state, num_controls)?;

        let horizon = self.time_points[num_intervals] - self.time_points[0];
        let shortest = durations
            .iter()
            .copied()
            .fold(T::infinity(), |acc, dt| acc.min(dt));
        let dwell_tolerance = shortest * constant::<T>(DWELL_TOLERANCE_FACTOR);

        let mut suffix_durations = vec![T::zero(); num_intervals + 1];
        for j in (0..num_intervals).rev() {
            suffix_durations[j] = suffix_durations[j + 1] + durations[j];
        }

        let mut suffix_relaxed = vec![T::zero(); num_controls * (num_intervals + 1)];
        for i in 0..num_controls {
            let row = &relaxed[i * num_intervals..(i + 1) * num_intervals];
            let out = &mut suffix_relaxed[i * (num_intervals + 1)..(i + 1) * (num_intervals + 1)];
            for j in (0..num_intervals).rev() {
                out[j] = out[j + 1] + durations[j] * row[j];
            }
        }

        Ok(Problem {
            num_controls,
            num_intervals,
            time_points: self.time_points,
            durations,
            relaxed,
            max_switches,
            min_up_times,
            min_down_times,
            max_up_times,
            total_max_up_times,
            valid,
            adjacency,
            pre_state,
            norm: self.norm,
            horizon,
            dwell_tolerance,
            suffix_durations,
            suffix_relaxed,
        })
    }
}

impl<T> std::fmt::Display for ProblemBuilder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ProblemBuilder(num_controls: {}, num_time_points: {})",
            self.relaxed.len(),
            self.time_points.len()
        )
    }
}

fn flatten_relaxed<T>(rows: &[Vec<T>], num_intervals: usize) -> Result<Vec<T>, ConfigurationError>
where
    T: SolverFloat,
{
    let lower = -constant::<T>(RELAXED_RANGE_TOLERANCE);
    let upper = T::one() + constant::<T>(RELAXED_RANGE_TOLERANCE);

    let mut flat = Vec::with_capacity(rows.len() * num_intervals);
    for (i, row) in rows.iter().enumerate() {
        if row.len() != num_intervals {
            return Err(ConfigurationError::shape(
                "b_rel",
                format!("{} entries in row {}", num_intervals, i),
                row.len(),
            ));
        }
        for (j, &value) in row.iter().enumerate() {
            if !(value >= lower && value <= upper) {
                return Err(ConfigurationError::value(
                    "b_rel",
                    format!("[{}][{}]", i, j),
                    format!("{} is outside of [0, 1]", value),
                ));
            }
        }
        flat.extend_from_slice(row);
    }
    Ok(flat)
}

fn check_relaxed_columns<T>(
    relaxed: &[T],
    num_controls: usize,
    num_intervals: usize,
) -> Result<(), ConfigurationError>
where
    T: SolverFloat,
{
    let tolerance = constant::<T>(COLUMN_SUM_TOLERANCE);
    for j in 0..num_intervals {
        let sum = (0..num_controls).fold(T::zero(), |acc, i| acc + relaxed[i * num_intervals + j]);
        if (sum - T::one()).abs() > tolerance {
            return Err(ConfigurationError::value(
                "b_rel",
                format!("column {}", j),
                format!("relaxed values sum to {} instead of 1", sum),
            ));
        }
    }
    Ok(())
}

fn per_control<V>(
    name: &'static str,
    values: Option<Vec<V>>,
    num_controls: usize,
    default: V,
) -> Result<Vec<V>, ConfigurationError>
where
    V: Clone,
{
    match values {
        None => Ok(vec![default; num_controls]),
        Some(values) if values.len() == num_controls => Ok(values),
        Some(values) => Err(ConfigurationError::shape(name, num_controls, values.len())),
    }
}

fn check_non_negative<T>(name: &'static str, values: &[T]) -> Result<(), ConfigurationError>
where
    T: SolverFloat,
{
    for (i, &value) in values.iter().enumerate() {
        if !(value >= T::zero()) {
            return Err(ConfigurationError::value(
                name,
                ControlIndex::new(i),
                format!("{} is negative or not a number", value),
            ));
        }
    }
    Ok(())
}

fn bit_matrix(
    name: &'static str,
    rows: Option<Vec<Vec<bool>>>,
    num_rows: usize,
    num_cols: usize,
) -> Result<FixedBitSet, ConfigurationError> {
    let mut bits = FixedBitSet::with_capacity(num_rows * num_cols);
    let Some(rows) = rows else {
        bits.insert_range(..);
        return Ok(bits);
    };

    if rows.len() != num_rows {
        return Err(ConfigurationError::shape(
            name,
            format!("{} x {}", num_rows, num_cols),
            format!("{} rows", rows.len()),
        ));
    }
    for (r, row) in rows.iter().enumerate() {
        if row.len() != num_cols {
            return Err(ConfigurationError::shape(
                name,
                format!("{} x {}", num_rows, num_cols),
                format!("{} entries in row {}", row.len(), r),
            ));
        }
        for (c, &flag) in row.iter().enumerate() {
            bits.set(r * num_cols + c, flag);
        }
    }
    Ok(bits)
}

fn resolve_pre_state(
    input: PreStateInput,
    num_controls: usize,
) -> Result<Option<ControlIndex>, ConfigurationError> {
    match input {
        PreStateInput::Unset => Ok(None),
        PreStateInput::Control(control) if control.get() < num_controls => Ok(Some(control)),
        PreStateInput::Control(control) => Err(ConfigurationError::value(
            "b_bin_pre",
            control,
            format!("only {} controls exist", num_controls),
        )),
        PreStateInput::Flags(flags) => {
            if flags.len() != num_controls {
                return Err(ConfigurationError::shape(
                    "b_bin_pre",
                    num_controls,
                    flags.len(),
                ));
            }
            let mut active = flags
                .iter()
                .enumerate()
                .filter(|&(_, &flag)| flag)
                .map(|(i, _)| ControlIndex::new(i));
            let first = active.next();
            if let Some(second) = active.next() {
                return Err(ConfigurationError::value(
                    "b_bin_pre",
                    second,
                    "more than one control is active before the horizon",
                ));
            }
            Ok(first)
        }
    }
}
