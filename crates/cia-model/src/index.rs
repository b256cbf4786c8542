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

//! # Strongly Typed Indices
//!
//! Controls and intervals are both addressed by `usize`, and mixing them up
//! is the classic bug in matrix-heavy code. `ControlIndex` (row of `b_rel`)
//! and `IntervalIndex` (column of `b_rel`) are distinct transparent newtypes.
//!
//! ```rust
//! use cia_model::index::{ControlIndex, IntervalIndex};
//!
//! let c = ControlIndex::new(1);
//! let j = IntervalIndex::new(3);
//! assert_eq!(c.get(), 1);
//! assert_eq!(format!("{}", j.next()), "IntervalIndex(4)");
//! ```

macro_rules! define_index {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(usize);

        impl $name {
            #[inline(always)]
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            /// Returns the underlying `usize`.
            #[inline(always)]
            pub const fn get(self) -> usize {
                self.0
            }

            /// Returns the index following this one.
            #[inline(always)]
            pub const fn next(self) -> Self {
                Self(self.0 + 1)
            }

            /// Iterates over the indices `0..count`.
            #[inline]
            pub fn range(count: usize) -> impl DoubleEndedIterator<Item = Self> + ExactSizeIterator {
                (0..count).map(Self)
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Debug::fmt(self, f)
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl From<$name> for usize {
            #[inline]
            fn from(index: $name) -> Self {
                index.0
            }
        }
    };
}

define_index!(
    /// The index of a binary control, a row of the relaxed and binary matrices.
    ControlIndex
);

define_index!(
    /// The index of an interval `[t_j, t_{j+1})` of the time grid.
    IntervalIndex
);
