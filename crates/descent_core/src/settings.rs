//! Run configuration and the named parameters a host can change.

use crate::error::DescentError;
use crate::solvers::UpdateRule;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Settings read by the engine at every step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DescentSettings {
    pub learning_rate: f64,
    pub max_iterations: usize,
    pub starting_x: f64,
    pub update_rule: UpdateRule,
}

impl Default for DescentSettings {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            max_iterations: 100,
            starting_x: 2.0,
            update_rule: UpdateRule::Guarded,
        }
    }
}

impl DescentSettings {
    /// Replaces invalid fields with their defaults.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        Self {
            learning_rate: if self.learning_rate.is_finite() && self.learning_rate > 0.0 {
                self.learning_rate
            } else {
                defaults.learning_rate
            },
            max_iterations: self.max_iterations,
            starting_x: if self.starting_x.is_finite() {
                self.starting_x
            } else {
                defaults.starting_x
            },
            update_rule: self.update_rule,
        }
    }
}

/// Options of the runner that do not influence the trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunnerOptions {
    /// Pause between a rendered step and the next one.
    pub frame_delay: Duration,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            frame_delay: Duration::from_millis(3000),
        }
    }
}

/// A control a host can change while the visualizer is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    LearningRate,
    MaxIterations,
    StartingX,
    Zoom,
    PanX,
}

impl FromStr for Parameter {
    type Err = DescentError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "learning_rate" | "learning-rate" => Ok(Parameter::LearningRate),
            "max_iterations" | "iterations" => Ok(Parameter::MaxIterations),
            "starting_x" | "starting-point" => Ok(Parameter::StartingX),
            "zoom" | "zoom_level" | "zoom-level" => Ok(Parameter::Zoom),
            "pan_x" | "pan-x" => Ok(Parameter::PanX),
            other => Err(DescentError::UnknownParameter(other.to_string())),
        }
    }
}

impl Parameter {
    /// Value used when the host hands over something unusable.
    pub fn default_value(self) -> f64 {
        let defaults = DescentSettings::default();
        match self {
            Parameter::LearningRate => defaults.learning_rate,
            Parameter::MaxIterations => defaults.max_iterations as f64,
            Parameter::StartingX => defaults.starting_x,
            Parameter::Zoom => 1.0,
            Parameter::PanX => 0.0,
        }
    }

    /// Parses raw control text, falling back to [`Parameter::default_value`].
    pub fn parse_value(self, raw: &str) -> f64 {
        match raw.trim().parse::<f64>() {
            Ok(value) => self.validate(value),
            Err(_) => {
                log::warn!("ignoring non-numeric {self:?} input {raw:?}");
                self.default_value()
            }
        }
    }

    /// Maps values outside the parameter's domain to the default.
    pub fn validate(self, value: f64) -> f64 {
        let valid = value.is_finite()
            && match self {
                Parameter::LearningRate | Parameter::Zoom => value > 0.0,
                Parameter::MaxIterations => value >= 0.0,
                Parameter::StartingX | Parameter::PanX => true,
            };
        if valid {
            value
        } else {
            log::warn!("ignoring out-of-domain {self:?} value {value}");
            self.default_value()
        }
    }
}
