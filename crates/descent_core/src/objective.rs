//! The fixed cost function `f(x) = x⁴ − 4x² + 5` and its slope.

use std::f64::consts::SQRT_2;

/// Magnitude of the derivative below which a run counts as converged.
pub const GRADIENT_THRESHOLD: f64 = 0.001;

/// Half-width of the central difference used for slope diagnostics.
pub const FINITE_DIFFERENCE_STEP: f64 = 1e-4;

/// The two local minima of the cost function, `±√2`.
pub const MINIMA: [f64; 2] = [-SQRT_2, SQRT_2];

/// Human readable form of the cost function, used as the plot caption.
pub const FORMULA: &str = "f(x) = x⁴ - 4x² + 5";

pub fn cost(x: f64) -> f64 {
    x.powi(4) - 4.0 * x.powi(2) + 5.0
}

pub fn derivative(x: f64) -> f64 {
    4.0 * x.powi(3) - 8.0 * x
}

/// Central-difference estimate of the slope at `x`.
pub fn numerical_slope(x: f64) -> f64 {
    let h = FINITE_DIFFERENCE_STEP;
    (cost(x + h) - cost(x - h)) / (2.0 * h)
}

/// True when the derivative at `x` is below [`GRADIENT_THRESHOLD`].
///
/// Non-finite positions are never converged.
pub fn is_converged(x: f64) -> bool {
    derivative(x).abs() < GRADIENT_THRESHOLD
}

/// Angle of a line with the given slope, in degrees folded into `[0, 180)`.
pub fn slope_angle_degrees(slope: f64) -> f64 {
    fold_degrees(slope.atan().to_degrees())
}

/// Folds an angle in degrees from `(-180, 180]` into `[0, 180)`.
pub fn fold_degrees(degrees: f64) -> f64 {
    if degrees < 0.0 {
        degrees + 180.0
    } else if degrees >= 180.0 {
        degrees - 180.0
    } else {
        degrees
    }
}
