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

//! The best complete solution found so far.
//!
//! The engine owns exactly one `Incumbent` slot and is its only writer. A
//! new incumbent replaces the old one only if its objective is strictly
//! smaller.

use cia_model::{num::SolverFloat, trajectory::BinaryTrajectory};

#[derive(Debug, Clone, PartialEq)]
pub struct Incumbent<T> {
    objective: T,
    trajectory: BinaryTrajectory,
}

impl<T> Incumbent<T>
where
    T: SolverFloat,
{
    #[inline]
    pub fn new(objective: T, trajectory: BinaryTrajectory) -> Self {
        Self {
            objective,
            trajectory,
        }
    }

    /// Returns the objective `eta` of the incumbent.
    #[inline]
    pub fn objective(&self) -> T {
        self.objective
    }

    #[inline]
    pub fn trajectory(&self) -> &BinaryTrajectory {
        &self.trajectory
    }

    #[inline]
    pub fn into_trajectory(self) -> BinaryTrajectory {
        self.trajectory
    }

    /// Returns `true` if `objective` strictly improves on this incumbent.
    #[inline]
    pub fn is_improved_by(&self, objective: T) -> bool {
        objective < self.objective
    }
}

impl<T> std::fmt::Display for Incumbent<T>
where
    T: SolverFloat,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Incumbent(objective: {}, controls: {}, intervals: {})",
            self.objective,
            self.trajectory.num_controls(),
            self.trajectory.num_intervals()
        )
    }
}
