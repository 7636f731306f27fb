//! Numeric state reported to the host after every change.

use crate::engine::{Engine, RunPhase};
use crate::objective::{cost, derivative, is_converged};
use serde::{Deserialize, Serialize};

/// Placeholder shown instead of a non-finite number.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayState {
    pub iteration: usize,
    pub x: f64,
    pub cost: f64,
    pub derivative: f64,
    pub converged: bool,
    pub phase: RunPhase,
}

impl DisplayState {
    pub fn from_engine(engine: &Engine) -> Self {
        let x = engine.position().x;
        Self {
            iteration: engine.run_state().iteration,
            x,
            cost: cost(x),
            derivative: derivative(x),
            converged: is_converged(x),
            phase: engine.phase(),
        }
    }

    /// The three numeric fields as display text, in `x, cost, derivative` order.
    pub fn formatted(&self) -> [String; 3] {
        [
            format_value(self.x),
            format_value(self.cost),
            format_value(self.derivative),
        ]
    }
}

/// Four decimals for finite values, [`NOT_AVAILABLE`] otherwise.
pub fn format_value(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.4}")
    } else {
        NOT_AVAILABLE.to_string()
    }
}
