//! Headless surface that records draw calls.

use super::style::{Color, Stroke, TextStyle};
use crate::traits::DrawSurface;
use crate::viewport::ScreenPoint;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Clear,
    Polyline {
        points: Vec<ScreenPoint>,
        stroke: Stroke,
    },
    Circle {
        center: ScreenPoint,
        radius: f64,
        fill: Color,
        outline: Option<Stroke>,
    },
    Arc {
        center: ScreenPoint,
        radius: f64,
        start: f64,
        end: f64,
        anticlockwise: bool,
        stroke: Stroke,
    },
    Polygon {
        points: Vec<ScreenPoint>,
        fill: Color,
    },
    Text {
        text: String,
        at: ScreenPoint,
        style: TextStyle,
    },
}

/// Keeps the commands of the most recent frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordingSurface {
    pub width: f64,
    pub height: f64,
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn circles(&self) -> impl Iterator<Item = (&ScreenPoint, f64, &Color)> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Circle {
                center,
                radius,
                fill,
                ..
            } => Some((center, *radius, fill)),
            _ => None,
        })
    }

    pub fn polylines(&self) -> impl Iterator<Item = (&[ScreenPoint], &Stroke)> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Polyline { points, stroke } => Some((points.as_slice(), stroke)),
            _ => None,
        })
    }
}

impl DrawSurface for RecordingSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
    }

    fn stroke_polyline(&mut self, points: &[ScreenPoint], stroke: &Stroke) {
        self.commands.push(DrawCommand::Polyline {
            points: points.to_vec(),
            stroke: stroke.clone(),
        });
    }

    fn fill_circle(
        &mut self,
        center: ScreenPoint,
        radius: f64,
        fill: Color,
        outline: Option<&Stroke>,
    ) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            fill,
            outline: outline.cloned(),
        });
    }

    fn stroke_arc(
        &mut self,
        center: ScreenPoint,
        radius: f64,
        start: f64,
        end: f64,
        anticlockwise: bool,
        stroke: &Stroke,
    ) {
        self.commands.push(DrawCommand::Arc {
            center,
            radius,
            start,
            end,
            anticlockwise,
            stroke: stroke.clone(),
        });
    }

    fn fill_polygon(&mut self, points: &[ScreenPoint], fill: Color) {
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            fill,
        });
    }

    fn fill_text(&mut self, text: &str, at: ScreenPoint, style: &TextStyle) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            at,
            style: style.clone(),
        });
    }
}
