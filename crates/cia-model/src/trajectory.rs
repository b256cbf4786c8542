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
    error::ConfigurationError,
    index::{ControlIndex, IntervalIndex},
};

/// A binary control trajectory satisfying SOS1 by construction.
///
/// Stored compactly as the active control per interval; the `n_c × n_t`
/// 0/1 matrix `b_bin` is available through [`BinaryTrajectory::to_matrix`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BinaryTrajectory {
    num_controls: usize,
    active: Vec<ControlIndex>,
}

impl BinaryTrajectory {
    /// Creates a trajectory from the active control of every interval.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if an active control is not in
    /// `0..num_controls`.
    pub fn new(
        num_controls: usize,
        active: Vec<ControlIndex>,
    ) -> Result<Self, ConfigurationError> {
        if let Some((j, control)) = active
            .iter()
            .enumerate()
            .find(|&(_, c)| c.get() >= num_controls)
        {
            return Err(ConfigurationError::value(
                "b_bin",
                IntervalIndex::new(j),
                format!("{} does not exist, only {} controls", control, num_controls),
            ));
        }
        Ok(Self {
            num_controls,
            active,
        })
    }

    /// Creates a trajectory without range checks.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if an active control is out of range.
    #[inline]
    pub fn from_active_unchecked(num_controls: usize, active: Vec<ControlIndex>) -> Self {
        debug_assert!(
            active.iter().all(|c| c.get() < num_controls),
            "called `BinaryTrajectory::from_active_unchecked` with a control index out of range"
        );
        Self {
            num_controls,
            active,
        }
    }

    /// Creates a trajectory from an `n_c × n_t` 0/1 matrix.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the rows have different lengths,
    /// an entry is neither 0 nor 1, or a column does not contain exactly one 1.
    pub fn from_matrix(b_bin: &[Vec<u8>]) -> Result<Self, ConfigurationError> {
        let num_controls = b_bin.len();
        if num_controls == 0 {
            return Err(ConfigurationError::NoControls);
        }
        let num_intervals = b_bin[0].len();
        if let Some((i, row)) = b_bin
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != num_intervals)
        {
            return Err(ConfigurationError::shape(
                "b_bin",
                format!("{} entries in row {}", num_intervals, i),
                row.len(),
            ));
        }

        let mut active = Vec::with_capacity(num_intervals);
        for j in 0..num_intervals {
            let mut chosen = None;
            for (i, row) in b_bin.iter().enumerate() {
                match row[j] {
                    0 => {}
                    1 if chosen.is_none() => chosen = Some(ControlIndex::new(i)),
                    1 => {
                        return Err(ConfigurationError::value(
                            "b_bin",
                            IntervalIndex::new(j),
                            "more than one control is active",
                        ));
                    }
                    other => {
                        return Err(ConfigurationError::value(
                            "b_bin",
                            format!("[{}][{}]", i, j),
                            format!("{} is not binary", other),
                        ));
                    }
                }
            }
            match chosen {
                Some(control) => active.push(control),
                None => {
                    return Err(ConfigurationError::value(
                        "b_bin",
                        IntervalIndex::new(j),
                        "no control is active",
                    ));
                }
            }
        }

        Ok(Self {
            num_controls,
            active,
        })
    }

    #[inline]
    pub fn num_controls(&self) -> usize {
        self.num_controls
    }

    #[inline]
    pub fn num_intervals(&self) -> usize {
        self.active.len()
    }

    /// Returns the control active during `interval_index`.
    ///
    /// # Panics
    ///
    /// Panics if `interval_index` is not in `0..num_intervals()`.
    #[inline]
    pub fn active_control(&self, interval_index: IntervalIndex) -> ControlIndex {
        self.active[interval_index.get()]
    }

    /// Returns the active control of every interval.
    #[inline]
    pub fn active_controls(&self) -> &[ControlIndex] {
        &self.active
    }

    #[inline]
    pub fn is_active(&self, control_index: ControlIndex, interval_index: IntervalIndex) -> bool {
        self.active[interval_index.get()] == control_index
    }

    /// Returns the `n_c × n_t` matrix `b_bin`.
    pub fn to_matrix(&self) -> Vec<Vec<u8>> {
        let mut matrix = vec![vec![0u8; self.active.len()]; self.num_controls];
        for (j, control) in self.active.iter().enumerate() {
            matrix[control.get()][j] = 1;
        }
        matrix
    }

    /// Counts the switches of every control.
    ///
    /// A change from control `a` to control `b` across a boundary counts one
    /// switch for `a` and one for `b`. The boundary into the first interval
    /// only counts when a pre-horizon state is given.
    pub fn switch_counts(&self, pre_state: Option<ControlIndex>) -> Vec<u32> {
        let mut counts = vec![0u32; self.num_controls];
        let mut previous = pre_state;
        for &current in &self.active {
            if let Some(prev) = previous
                && prev != current
            {
                counts[prev.get()] = counts[prev.get()].saturating_add(1);
                counts[current.get()] = counts[current.get()].saturating_add(1);
            }
            previous = Some(current);
        }
        counts
    }
}

impl std::fmt::Display for BinaryTrajectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, row) in self.to_matrix().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for (j, value) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", value)?;
            }
        }
        Ok(())
    }
}
