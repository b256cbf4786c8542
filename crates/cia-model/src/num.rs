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

//! # Solver Float Trait
//!
//! Unified numeric bounds for the approximation model and the search engine.
//! `SolverFloat` collects the floating-point capabilities the pipeline needs
//! (`num_traits::Float` arithmetic, primitive conversions, formatting and
//! thread-safety) into a single alias so generic signatures stay short.
//!
//! `f64` is the reference type. `f32` works as well, at the price of a
//! coarser dwell tolerance and earlier rounding in long horizons.

use num_traits::{Float, FromPrimitive};

/// A trait alias for the floating-point types the model and the solver accept.
pub trait SolverFloat:
    Float + FromPrimitive + std::fmt::Debug + std::fmt::Display + Send + Sync + 'static
{
}

impl<T> SolverFloat for T where
    T: Float + FromPrimitive + std::fmt::Debug + std::fmt::Display + Send + Sync + 'static
{
}

/// Converts an `f64` constant into `T`.
///
/// Falls back to zero for types that cannot represent the value, which
/// turns the affected tolerance into an exact comparison.
#[inline]
pub fn constant<T>(value: f64) -> T
where
    T: SolverFloat,
{
    T::from_f64(value).unwrap_or_else(T::zero)
}

/// Returns `true` if `a` and `b` agree up to a relative tolerance.
///
/// The tolerance is scaled by `1 + max(|a|, |b|)` so it degrades
/// gracefully to an absolute check around zero.
#[inline]
pub fn approx_eq<T>(a: T, b: T, tolerance: T) -> bool
where
    T: SolverFloat,
{
    let scale = T::one() + a.abs().max(b.abs());
    (a - b).abs() <= tolerance * scale
}

/// Orders two floats, placing NaN after every number.
///
/// Bounds and objectives are never NaN for validated problems; the NaN
/// branch only keeps the ordering total.
#[inline]
pub fn total_order<T>(a: T, b: T) -> std::cmp::Ordering
where
    T: SolverFloat,
{
    a.partial_cmp(&b)
        .unwrap_or_else(|| a.is_nan().cmp(&b.is_nan()))
}
