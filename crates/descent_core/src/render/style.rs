//! Colours, strokes and fonts used by the renderer.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    /// Linear blend from `self` (t = 0) to `other` (t = 1).
    pub fn lerp(self, other: Color, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let channel = |from: u8, to: u8| -> u8 {
            (from as f64 + (to as f64 - from as f64) * t).round() as u8
        };
        Self {
            r: channel(self.r, other.r),
            g: channel(self.g, other.g),
            b: channel(self.b, other.b),
            a: self.a + (other.a - self.a) * t,
        }
    }
}

/// CSS `rgba()` notation, as accepted by canvas style setters.
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
    /// Alternating dash and gap lengths; empty for a solid line.
    #[serde(default)]
    pub dash: Vec<f64>,
}

impl Stroke {
    pub fn solid(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            dash: Vec::new(),
        }
    }

    pub fn dashed(color: Color, width: f64, dash: &[f64]) -> Self {
        Self {
            color,
            width,
            dash: dash.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextBaseline {
    Alphabetic,
    Top,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font: String,
    pub color: Color,
    pub align: TextAlign,
    pub baseline: TextBaseline,
}

impl TextStyle {
    pub fn new(font: &str, color: Color) -> Self {
        Self {
            font: font.to_string(),
            color,
            align: TextAlign::Left,
            baseline: TextBaseline::Alphabetic,
        }
    }

    pub fn centered(mut self) -> Self {
        self.align = TextAlign::Center;
        self
    }

    pub fn hanging(mut self) -> Self {
        self.baseline = TextBaseline::Top;
        self
    }
}

/// Colour scheme of the plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub function_curve: Color,
    pub path: Color,
    pub path_start: Color,
    pub path_end: Color,
    pub current_point: Color,
    pub tangent_line: Color,
    pub direction_arrow: Color,
    pub angle_arc: Color,
    pub grid_lines: Color,
    pub axis_lines: Color,
    pub label: Color,
    pub marker_outline: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            function_curve: Color::rgb(99, 102, 241),
            path: Color::rgb(16, 185, 129),
            path_start: Color::rgb(16, 82, 204),
            path_end: Color::rgb(16, 185, 129),
            current_point: Color::rgb(239, 68, 68),
            tangent_line: Color::rgb(139, 92, 246),
            direction_arrow: Color::rgb(239, 68, 68),
            angle_arc: Color::rgba(255, 165, 0, 0.8),
            grid_lines: Color::rgba(226, 232, 240, 0.6),
            axis_lines: Color::rgba(100, 116, 139, 0.8),
            label: Color::rgb(255, 255, 255),
            marker_outline: Color::rgba(255, 255, 255, 0.7),
        }
    }
}
