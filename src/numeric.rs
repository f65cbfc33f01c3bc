//! Floating point comparison helpers, thin wrappers around the `approx` crate.
//!
//! The integrator keeps `S + I + R` equal to the population by rescaling every step, so most
//! checks in this crate are of the form "this total is the population, up to rounding".
//! [`almost_eq`] covers absolute comparisons and [`relative_deviation`] measures how far a total
//! has drifted from the quantity it is supposed to conserve.

use approx::{AbsDiffEq, RelativeEq};

/// Relative tolerance used when checking that compartments sum to the population.
pub const CONSERVATION_TOLERANCE: f64 = 1e-6;

/// Compares if two floats are close via `approx::abs_diff_eq` using a maximum absolute difference
/// (epsilon) of `acc`.
#[must_use]
pub fn almost_eq(a: f64, b: f64, acc: f64) -> bool {
    if a.is_infinite() && b.is_infinite() {
        return a == b;
    }
    a.abs_diff_eq(&b, acc)
}

/// Compares if two floats agree to within `max_relative` of the larger magnitude.
#[must_use]
pub fn relatively_eq(a: f64, b: f64, max_relative: f64) -> bool {
    a.relative_eq(&b, f64::EPSILON, max_relative)
}

/// Returns `|value - reference| / |reference|`. A zero reference yields the absolute deviation.
#[must_use]
pub fn relative_deviation(value: f64, reference: f64) -> f64 {
    let deviation = (value - reference).abs();
    if reference == 0.0 {
        deviation
    } else {
        deviation / reference.abs()
    }
}
