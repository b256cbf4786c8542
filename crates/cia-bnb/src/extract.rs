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

//! Solution extraction.
//!
//! Converts the decision path of an accepted leaf into a trajectory, and an
//! incumbent into the public `(b_bin, eta)` pair. Extraction trusts the
//! engine: feasibility is not re-checked here.

use crate::{
    error::{BnbError, BnbResult},
    incumbent::Incumbent,
    path::{PathArena, PathHandle},
};
use cia_model::{index::ControlIndex, num::SolverFloat, trajectory::BinaryTrajectory};

/// Rebuilds the trajectory ending at `path`.
///
/// `scratch` is reused between calls to avoid reallocations.
///
/// # Errors
///
/// Returns `BnbError::Internal` if the path does not cover exactly
/// `num_intervals` decisions or names a control out of range.
pub fn extract_trajectory(
    arena: &PathArena,
    path: Option<PathHandle>,
    num_controls: usize,
    num_intervals: usize,
    scratch: &mut Vec<ControlIndex>,
) -> BnbResult<BinaryTrajectory> {
    arena.collect_into(path, scratch);
    if scratch.len() != num_intervals {
        return Err(BnbError::Internal(format!(
            "leaf path has {} decisions, expected {}",
            scratch.len(),
            num_intervals
        )));
    }
    if let Some(bad) = scratch.iter().find(|c| c.get() >= num_controls) {
        return Err(BnbError::Internal(format!(
            "leaf path references {} but the problem has {} controls",
            bad, num_controls
        )));
    }
    Ok(BinaryTrajectory::from_active_unchecked(
        num_controls,
        scratch.clone(),
    ))
}

/// Returns the incumbent as a binary matrix `b_bin[i][j]` and its objective.
pub fn extract<T>(incumbent: &Incumbent<T>) -> (Vec<Vec<u8>>, T)
where
    T: SolverFloat,
{
    (incumbent.trajectory().to_matrix(), incumbent.objective())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ci(i: usize) -> ControlIndex {
        ControlIndex::new(i)
    }

    #[test]
    fn test_extract_trajectory_from_path() {
        let mut arena = PathArena::new();
        let a = arena.push(None, ci(1)).unwrap();
        let b = arena.push(Some(a), ci(0)).unwrap();
        let mut scratch = Vec::new();

        let trajectory = extract_trajectory(&arena, Some(b), 2, 2, &mut scratch).unwrap();
        assert_eq!(trajectory.active_controls(), &[ci(1), ci(0)]);

        let incumbent = Incumbent::new(0.25f64, trajectory);
        let (b_bin, eta) = extract(&incumbent);
        assert_eq!(b_bin, vec![vec![0, 1], vec![1, 0]]);
        assert_eq!(eta, 0.25);
    }

    #[test]
    fn test_extract_rejects_short_path() {
        let mut arena = PathArena::new();
        let a = arena.push(None, ci(0)).unwrap();
        let mut scratch = Vec::new();
        let err = extract_trajectory(&arena, Some(a), 2, 3, &mut scratch).unwrap_err();
        assert!(matches!(err, BnbError::Internal(_)));
    }

    #[test]
    fn test_extract_rejects_out_of_range_control() {
        let mut arena = PathArena::new();
        let a = arena.push(None, ci(4)).unwrap();
        let mut scratch = Vec::new();
        assert!(extract_trajectory(&arena, Some(a), 2, 1, &mut scratch).is_err());
    }
}
