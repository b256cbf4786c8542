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

//! Configuration errors.
//!
//! Everything that can go wrong before a search starts is reported as a
//! `ConfigurationError`: malformed problem data, shape mismatches between the
//! constraint arrays, unknown norm or strategy names and invalid solver
//! options. None of these are ever silently coerced.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("problem must contain at least one control")]
    NoControls,

    #[error("time grid must contain at least two points, got {0}")]
    EmptyHorizon(usize),

    #[error("time points must be finite and strictly increasing (violated at index {index})")]
    NonIncreasingTime { index: usize },

    #[error("shape mismatch for `{name}`: expected {expected}, got {actual}")]
    ShapeMismatch {
        name: &'static str,
        expected: String,
        actual: String,
    },

    #[error("invalid value for `{name}` at {location}: {reason}")]
    InvalidValue {
        name: &'static str,
        location: String,
        reason: String,
    },

    #[error("unknown norm `{0}`, expected one of max_norm, column_sum_norm, row_sum_norm")]
    UnknownNorm(String),

    #[error("unknown search strategy `{0}`, expected one of dfs, bfs, dbt")]
    UnknownStrategy(String),

    #[error("search strategy `{0}` is not supported")]
    UnsupportedStrategy(String),

    #[error("invalid value for option `{name}`: {reason}")]
    InvalidOption { name: String, reason: String },

    #[error("unknown option `{0}`")]
    UnknownOption(String),
}

impl ConfigurationError {
    #[inline]
    pub(crate) fn shape<E, A>(name: &'static str, expected: E, actual: A) -> Self
    where
        E: std::fmt::Display,
        A: std::fmt::Display,
    {
        ConfigurationError::ShapeMismatch {
            name,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    #[inline]
    pub(crate) fn value<L, R>(name: &'static str, location: L, reason: R) -> Self
    where
        L: std::fmt::Display,
        R: Into<String>,
    {
        ConfigurationError::InvalidValue {
            name,
            location: location.to_string(),
            reason: reason.into(),
        }
    }
}
