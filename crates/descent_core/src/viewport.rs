//! Mapping between function space and the display surface.

use serde::{Deserialize, Serialize};

pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 20.0;

/// Pixels per function unit along x at zoom 1.
pub const BASE_SCALE_X: f64 = 80.0;
/// Pixels per function unit along y at zoom 1.
pub const BASE_SCALE_Y: f64 = 15.0;

/// Fraction of the surface height where `y = 0` sits.
const ORIGIN_HEIGHT_FRACTION: f64 = 0.6;

/// Zoom level below which the zoom controls move in fine increments.
const FINE_ZOOM_LIMIT: f64 = 5.0;
const FINE_ZOOM_STEP: f64 = 0.5;
const COARSE_ZOOM_STEP: f64 = 1.0;

/// User-controlled view parameters. Never affects the trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    zoom_level: f64,
    pub pan_x: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom_level: 1.0,
            pan_x: 0.0,
        }
    }
}

impl ViewState {
    pub fn new(zoom_level: f64, pan_x: f64) -> Self {
        let mut view = Self::default();
        view.set_zoom(zoom_level);
        view.pan_x = pan_x;
        view
    }

    pub fn zoom_level(&self) -> f64 {
        self.zoom_level
    }

    /// Sets the zoom, clamped to `[MIN_ZOOM, MAX_ZOOM]`.
    pub fn set_zoom(&mut self, zoom_level: f64) {
        if zoom_level.is_nan() {
            return;
        }
        self.zoom_level = zoom_level.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn zoom_in(&mut self) {
        let step = if self.zoom_level < FINE_ZOOM_LIMIT {
            FINE_ZOOM_STEP
        } else {
            COARSE_ZOOM_STEP
        };
        self.set_zoom(self.zoom_level + step);
    }

    pub fn zoom_out(&mut self) {
        let step = if self.zoom_level > FINE_ZOOM_LIMIT {
            COARSE_ZOOM_STEP
        } else {
            FINE_ZOOM_STEP
        };
        self.set_zoom(self.zoom_level - step);
    }

    pub fn scale_x(&self) -> f64 {
        BASE_SCALE_X * self.zoom_level
    }

    pub fn scale_y(&self) -> f64 {
        BASE_SCALE_Y * self.zoom_level
    }
}

/// A point on the display surface, in pixels with y pointing down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The affine map for one frame. All drawing goes through it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub center_x: f64,
    pub center_y: f64,
    pub pan_x: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, view: &ViewState) -> Self {
        Self {
            width,
            height,
            center_x: width / 2.0,
            center_y: height * ORIGIN_HEIGHT_FRACTION,
            pan_x: view.pan_x,
            scale_x: view.scale_x(),
            scale_y: view.scale_y(),
        }
    }

    pub fn to_screen_x(&self, x: f64) -> f64 {
        self.center_x + (x - self.pan_x) * self.scale_x
    }

    pub fn to_screen_y(&self, y: f64) -> f64 {
        self.center_y - y * self.scale_y
    }

    pub fn to_screen(&self, x: f64, y: f64) -> ScreenPoint {
        ScreenPoint::new(self.to_screen_x(x), self.to_screen_y(y))
    }

    pub fn to_function_x(&self, px: f64) -> f64 {
        (px - self.center_x) / self.scale_x + self.pan_x
    }

    pub fn to_function_y(&self, py: f64) -> f64 {
        (self.center_y - py) / self.scale_y
    }

    /// Function-space x range covered by the surface width.
    pub fn visible_x_range(&self) -> (f64, f64) {
        (self.to_function_x(0.0), self.to_function_x(self.width))
    }

    /// Integer x values whose grid lines may fall on the surface.
    pub fn integer_x_span(&self) -> (i64, i64) {
        let half_width = (self.center_x / self.scale_x).floor();
        let left = (self.pan_x - half_width).floor() - 1.0;
        let right = (self.pan_x + half_width).ceil() + 1.0;
        (left as i64, right as i64)
    }

    /// Number of whole y units that fit above and below the x axis.
    pub fn integer_y_span(&self) -> (i64, i64) {
        let above = (self.center_y / self.scale_y).floor();
        let below = ((self.height - self.center_y) / self.scale_y).floor();
        (above as i64, below as i64)
    }
}
