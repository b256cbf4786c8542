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

use crate::error::ConfigurationError;

/// The norm that aggregates the accumulated deviations into the scalar
/// objective `eta`.
///
/// With `acc[i][j] = Σ_{k ≤ j} dt[k] · (b_rel[i][k] − b_bin[i][k])`:
///
/// | Norm | Objective |
/// | :--- | :--- |
/// | `MaxNorm` | `max_{i,j} |acc[i][j]|` |
/// | `ColumnSumNorm` | `max_j Σ_i |acc[i][j]|` |
/// | `RowSumNorm` | `max_i Σ_j |acc[i][j]|` |
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum CiaNorm {
    #[default]
    MaxNorm,
    ColumnSumNorm,
    RowSumNorm,
}

impl CiaNorm {
    pub const ALL: [CiaNorm; 3] = [
        CiaNorm::MaxNorm,
        CiaNorm::ColumnSumNorm,
        CiaNorm::RowSumNorm,
    ];

    /// Returns the canonical configuration name of the norm.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            CiaNorm::MaxNorm => "max_norm",
            CiaNorm::ColumnSumNorm => "column_sum_norm",
            CiaNorm::RowSumNorm => "row_sum_norm",
        }
    }
}

impl std::fmt::Display for CiaNorm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CiaNorm {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "max_norm" => Ok(CiaNorm::MaxNorm),
            "column_sum_norm" => Ok(CiaNorm::ColumnSumNorm),
            "row_sum_norm" => Ok(CiaNorm::RowSumNorm),
            other => Err(ConfigurationError::UnknownNorm(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrips_names() {
        for norm in CiaNorm::ALL {
            assert_eq!(norm.as_str().parse::<CiaNorm>(), Ok(norm));
        }
    }

    #[test]
    fn test_unknown_norm_is_rejected() {
        let err = "l2_norm".parse::<CiaNorm>().unwrap_err();
        assert_eq!(err, ConfigurationError::UnknownNorm("l2_norm".into()));
    }

    #[test]
    fn test_default_is_max_norm() {
        assert_eq!(CiaNorm::default(), CiaNorm::MaxNorm);
    }
}
