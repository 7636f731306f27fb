use crate::display::DisplayState;
use crate::render::style::{Color, Stroke, TextStyle};
use crate::viewport::ScreenPoint;
use std::time::Duration;

/// A 2D drawing target. Coordinates are pixels with y pointing down.
///
/// The renderer computes all geometry; implementations only rasterize.
pub trait DrawSurface {
    /// Width and height in pixels.
    fn size(&self) -> (f64, f64);

    fn clear(&mut self);

    fn stroke_polyline(&mut self, points: &[ScreenPoint], stroke: &Stroke);

    /// Filled disc with an optional outline.
    fn fill_circle(
        &mut self,
        center: ScreenPoint,
        radius: f64,
        fill: Color,
        outline: Option<&Stroke>,
    );

    /// Arc from `start` to `end` radians, measured clockwise on screen.
    fn stroke_arc(
        &mut self,
        center: ScreenPoint,
        radius: f64,
        start: f64,
        end: f64,
        anticlockwise: bool,
        stroke: &Stroke,
    );

    fn fill_polygon(&mut self, points: &[ScreenPoint], fill: Color);

    fn fill_text(&mut self, text: &str, at: ScreenPoint, style: &TextStyle);
}

/// Receives the numeric state shown next to the plot.
pub trait DisplaySink {
    fn display_state(&mut self, state: &DisplayState);
}

impl DisplaySink for Vec<DisplayState> {
    fn display_state(&mut self, state: &DisplayState) {
        self.push(state.clone());
    }
}

/// Identifies one scheduled tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickId(pub u64);

/// The capability to run the next tick later, on the same thread.
pub trait Scheduler {
    fn schedule(&mut self, delay: Duration) -> TickId;

    /// Withdraws a tick. Unknown or already delivered ids are ignored.
    fn cancel(&mut self, tick: TickId);
}
