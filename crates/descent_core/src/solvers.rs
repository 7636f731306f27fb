use crate::objective::derivative;
use serde::{Deserialize, Serialize};

/// Largest gradient magnitude fed into the update.
pub const MAX_GRADIENT: f64 = 10.0;

/// Gradient magnitude above which the learning rate is damped.
pub const DAMPING_THRESHOLD: f64 = 5.0;

/// Largest distance a single guarded step may move `x`.
pub const MAX_STEP: f64 = 1.0;

/// How a gradient turns into a move along x.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateRule {
    /// Gradient clipping, adaptive learning rate and step-size limiting.
    #[default]
    Guarded,
    /// `x ← x − lr · f'(x)` with no safeguards.
    Plain,
}

/// Every intermediate value of one update, before it is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlannedStep {
    pub gradient: f64,
    pub clipped_gradient: f64,
    pub learning_rate: f64,
    pub raw_step: f64,
    /// Amount subtracted from `x`.
    pub applied_step: f64,
}

impl PlannedStep {
    pub fn gradient_clipped(&self) -> bool {
        self.clipped_gradient != self.gradient
    }

    pub fn step_limited(&self) -> bool {
        self.applied_step != self.raw_step
    }
}

/// Caps the magnitude at [`MAX_GRADIENT`], keeping the sign.
pub fn clip_gradient(gradient: f64) -> f64 {
    if gradient.abs() > MAX_GRADIENT {
        gradient.signum() * MAX_GRADIENT
    } else {
        gradient
    }
}

/// Damps `base` as the gradient steepens past [`DAMPING_THRESHOLD`].
pub fn adaptive_learning_rate(base: f64, gradient: f64) -> f64 {
    let magnitude = gradient.abs();
    if magnitude > DAMPING_THRESHOLD {
        base / (1.0 + (magnitude / DAMPING_THRESHOLD).log10())
    } else {
        base
    }
}

/// Caps the magnitude at [`MAX_STEP`], keeping the sign.
pub fn limit_step(step: f64) -> f64 {
    if step.abs() > MAX_STEP {
        step.signum() * MAX_STEP
    } else {
        step
    }
}

impl UpdateRule {
    /// Computes the step taken from `x` without applying it.
    pub fn plan(self, x: f64, learning_rate: f64) -> PlannedStep {
        let gradient = derivative(x);
        match self {
            UpdateRule::Guarded => {
                let clipped_gradient = clip_gradient(gradient);
                let learning_rate = adaptive_learning_rate(learning_rate, clipped_gradient);
                let raw_step = learning_rate * clipped_gradient;
                PlannedStep {
                    gradient,
                    clipped_gradient,
                    learning_rate,
                    raw_step,
                    applied_step: limit_step(raw_step),
                }
            }
            UpdateRule::Plain => {
                let raw_step = learning_rate * gradient;
                PlannedStep {
                    gradient,
                    clipped_gradient: gradient,
                    learning_rate,
                    raw_step,
                    applied_step: raw_step,
                }
            }
        }
    }
}
