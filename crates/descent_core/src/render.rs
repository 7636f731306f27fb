//! Draws one frame of the visualization onto a [`DrawSurface`].
//!
//! Every coordinate goes through [`Viewport`]; nothing here keeps state
//! between frames and nothing here mutates the engine.

pub mod recording;
pub mod style;

use crate::engine::Engine;
use crate::objective::{cost, derivative, fold_degrees, FORMULA, GRADIENT_THRESHOLD, MINIMA};
use crate::settings::DescentSettings;
use crate::traits::DrawSurface;
use crate::viewport::{ScreenPoint, ViewState, Viewport};
use std::f64::consts::FRAC_PI_6;
use style::{Palette, Stroke, TextStyle};

/// Spacing of curve samples, in function units.
pub const CURVE_SAMPLE_STEP: f64 = 0.02;
/// Extra function-space margin sampled beyond each visible edge.
const CURVE_MARGIN: f64 = 0.5;
/// Half length of the drawn tangent, in function units.
pub const TANGENT_HALF_LENGTH: f64 = 0.1;
/// Every n-th path point carries its index.
pub const PATH_LABEL_INTERVAL: usize = 5;

const ARROW_BASE_LENGTH: f64 = 25.0;
const ARROW_HEAD_LENGTH: f64 = 8.0;
const ANGLE_ARC_RADIUS: f64 = 20.0;
const PATH_MARKER_RADIUS: f64 = 5.0;
const CURRENT_MARKER_RADIUS: f64 = 6.0;
const CURRENT_GLOW_RADIUS: f64 = 10.0;
const PATH_ALPHA_START: f64 = 0.4;
const PATH_ALPHA_END: f64 = 0.9;

const GRID_FONT: &str = "11px Inter, sans-serif";
const AXIS_FONT: &str = "12px Inter, sans-serif";
const CAPTION_FONT: &str = "14px Inter, sans-serif";
const ANNOTATION_FONT: &str = "10px Arial";

/// Everything a frame is drawn from.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub engine: &'a Engine,
    pub settings: &'a DescentSettings,
    pub view: &'a ViewState,
}

/// Arrow showing where the next step will actually move the point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionIndicator {
    pub origin: ScreenPoint,
    pub tip: ScreenPoint,
    /// Screen-space angle of the arrow, radians, y pointing down.
    pub angle: f64,
    /// Angle of the step in function units, degrees folded into `[0, 180)`.
    pub label_degrees: f64,
}

pub fn render(surface: &mut impl DrawSurface, scene: &Scene<'_>, palette: &Palette) {
    let (width, height) = surface.size();
    let viewport = Viewport::new(width, height, scene.view);

    surface.clear();
    draw_grid(surface, &viewport, palette);
    draw_axes(surface, &viewport, palette);
    draw_reference_points(surface, &viewport, palette);
    draw_curve(surface, &viewport, palette);
    draw_path(surface, &viewport, scene.engine, palette);
    draw_current_point(surface, &viewport, scene, palette);

    let caption = TextStyle::new(CAPTION_FONT, palette.function_curve).hanging();
    surface.fill_text(FORMULA, ScreenPoint::new(15.0, 15.0), &caption);
}

fn draw_grid(surface: &mut impl DrawSurface, viewport: &Viewport, palette: &Palette) {
    let stroke = Stroke::dashed(palette.grid_lines, 0.8, &[2.0, 3.0]);
    let label = TextStyle::new(GRID_FONT, palette.axis_lines);
    let axis_y = viewport.to_screen_y(0.0);
    let axis_x = viewport.to_screen_x(0.0);

    let (left, right) = viewport.integer_x_span();
    for x in left..=right {
        if x == 0 {
            continue;
        }
        let sx = viewport.to_screen_x(x as f64);
        surface.stroke_polyline(
            &[ScreenPoint::new(sx, 0.0), ScreenPoint::new(sx, viewport.height)],
            &stroke,
        );
        surface.fill_text(&x.to_string(), ScreenPoint::new(sx + 2.0, axis_y + 15.0), &label);
    }

    let (above, below) = viewport.integer_y_span();
    let rows = (1..=above).chain((1..=below).map(|y| -y));
    for y in rows {
        let sy = viewport.to_screen_y(y as f64);
        surface.stroke_polyline(
            &[ScreenPoint::new(0.0, sy), ScreenPoint::new(viewport.width, sy)],
            &stroke,
        );
        surface.fill_text(&y.to_string(), ScreenPoint::new(axis_x + 5.0, sy - 3.0), &label);
    }
}

fn draw_axes(surface: &mut impl DrawSurface, viewport: &Viewport, palette: &Palette) {
    let stroke = Stroke::solid(palette.axis_lines, 1.5);
    let axis_y = viewport.to_screen_y(0.0);
    let axis_x = viewport.to_screen_x(0.0);

    surface.stroke_polyline(
        &[ScreenPoint::new(0.0, axis_y), ScreenPoint::new(viewport.width, axis_y)],
        &stroke,
    );
    surface.stroke_polyline(
        &[ScreenPoint::new(axis_x, 0.0), ScreenPoint::new(axis_x, viewport.height)],
        &stroke,
    );

    let label = TextStyle::new(AXIS_FONT, palette.axis_lines).centered();
    surface.fill_text("x", ScreenPoint::new(viewport.width - 15.0, axis_y - 10.0), &label);
    surface.fill_text("y", ScreenPoint::new(axis_x + 15.0, 15.0), &label);
}

fn draw_reference_points(surface: &mut impl DrawSurface, viewport: &Viewport, palette: &Palette) {
    let stroke = Stroke::solid(palette.axis_lines, 1.5);
    let label = TextStyle::new(AXIS_FONT, palette.axis_lines)
        .centered()
        .hanging();
    let axis_y = viewport.to_screen_y(0.0);
    let marks = [(MINIMA[0], "-√2"), (0.0, "0"), (MINIMA[1], "√2")];

    for (x, text) in marks {
        let sx = viewport.to_screen_x(x);
        surface.stroke_polyline(
            &[ScreenPoint::new(sx, axis_y - 5.0), ScreenPoint::new(sx, axis_y + 5.0)],
            &stroke,
        );
        surface.fill_text(text, ScreenPoint::new(sx, axis_y + 8.0), &label);
    }
}

/// Screen-space samples of the cost curve across the visible range.
pub fn curve_points(viewport: &Viewport) -> Vec<ScreenPoint> {
    let (left, right) = viewport.visible_x_range();
    let start = left - CURVE_MARGIN;
    let span = right - start + CURVE_MARGIN;
    let samples = (span / CURVE_SAMPLE_STEP).ceil() as usize;

    (0..=samples)
        .map(|i| {
            let x = start + i as f64 * CURVE_SAMPLE_STEP;
            viewport.to_screen(x, cost(x))
        })
        .collect()
}

fn draw_curve(surface: &mut impl DrawSurface, viewport: &Viewport, palette: &Palette) {
    let points = curve_points(viewport);
    surface.stroke_polyline(&points, &Stroke::solid(palette.function_curve, 3.0));
}

fn draw_path(surface: &mut impl DrawSurface, viewport: &Viewport, engine: &Engine, palette: &Palette) {
    let path = engine.path();
    if path.is_empty() {
        return;
    }

    let points: Vec<ScreenPoint> = path.iter().map(|p| viewport.to_screen(p.x, p.y)).collect();
    let last = (points.len() - 1).max(1) as f64;

    for (i, segment) in points.windows(2).enumerate() {
        let progress = (i + 1) as f64 / last;
        let alpha = PATH_ALPHA_START + (PATH_ALPHA_END - PATH_ALPHA_START) * progress;
        surface.stroke_polyline(segment, &Stroke::solid(palette.path.with_alpha(alpha), 2.5));
    }

    let outline = Stroke::solid(palette.marker_outline, 1.0);
    let label = TextStyle::new(ANNOTATION_FONT, palette.label).centered();
    for (i, point) in points.iter().enumerate() {
        let fill = palette.path_start.lerp(palette.path_end, i as f64 / last);
        surface.fill_circle(*point, PATH_MARKER_RADIUS, fill, Some(&outline));
        if i > 0 && i % PATH_LABEL_INTERVAL == 0 {
            surface.fill_text(&i.to_string(), ScreenPoint::new(point.x, point.y - 8.0), &label);
        }
    }
}

fn draw_current_point(
    surface: &mut impl DrawSurface,
    viewport: &Viewport,
    scene: &Scene<'_>,
    palette: &Palette,
) {
    let position = scene.engine.position();
    if !position.is_finite() {
        return;
    }
    let center = viewport.to_screen(position.x, position.y);

    surface.fill_circle(
        center,
        CURRENT_GLOW_RADIUS,
        palette.current_point.with_alpha(0.3),
        None,
    );
    surface.fill_circle(
        center,
        CURRENT_MARKER_RADIUS,
        palette.current_point,
        Some(&Stroke::solid(palette.label, 1.5)),
    );

    if !scene.engine.is_running() && scene.engine.is_converged() {
        return;
    }

    let slope = derivative(position.x);
    let tangent = [
        viewport.to_screen(
            position.x - TANGENT_HALF_LENGTH,
            position.y - slope * TANGENT_HALF_LENGTH,
        ),
        viewport.to_screen(
            position.x + TANGENT_HALF_LENGTH,
            position.y + slope * TANGENT_HALF_LENGTH,
        ),
    ];
    surface.stroke_polyline(&tangent, &Stroke::solid(palette.tangent_line, 2.5));
    surface.fill_circle(center, 3.0, palette.tangent_line, None);

    if let Some(indicator) = direction_indicator(viewport, scene.engine, scene.settings) {
        draw_direction_indicator(surface, &indicator, palette);
    }
}

/// Direction of the step the engine would take next from its position.
///
/// Built from the applied step `(−s, f(x − s) − f(x))` mapped to the screen,
/// so the arrow is parallel to the path segment the step will draw. `None`
/// when the point is not finite, the slope is flat, or the step is zero.
pub fn direction_indicator(
    viewport: &Viewport,
    engine: &Engine,
    settings: &DescentSettings,
) -> Option<DirectionIndicator> {
    let position = engine.position();
    if !position.is_finite() {
        return None;
    }
    let slope = derivative(position.x);
    if slope.abs() <= GRADIENT_THRESHOLD {
        return None;
    }

    let plan = settings.update_rule.plan(position.x, settings.learning_rate);
    let step_x = -plan.applied_step;
    let step_y = cost(position.x + step_x) - cost(position.x);
    let dx = step_x * viewport.scale_x;
    let dy = -step_y * viewport.scale_y;
    if !(dx.is_finite() && dy.is_finite()) || (dx == 0.0 && dy == 0.0) {
        return None;
    }

    let angle = dy.atan2(dx);
    let length = ARROW_BASE_LENGTH * (slope.abs().min(10.0) / 2.0).clamp(0.5, 2.0);
    let origin = viewport.to_screen(position.x, position.y);
    Some(DirectionIndicator {
        origin,
        tip: ScreenPoint::new(
            origin.x + angle.cos() * length,
            origin.y + angle.sin() * length,
        ),
        angle,
        label_degrees: fold_degrees(step_y.atan2(step_x).to_degrees()),
    })
}

fn draw_direction_indicator(
    surface: &mut impl DrawSurface,
    indicator: &DirectionIndicator,
    palette: &Palette,
) {
    let DirectionIndicator {
        origin, tip, angle, ..
    } = *indicator;

    surface.stroke_polyline(&[origin, tip], &Stroke::solid(palette.direction_arrow, 2.0));
    let barb = |offset: f64| {
        ScreenPoint::new(
            tip.x - ARROW_HEAD_LENGTH * (angle + offset).cos(),
            tip.y - ARROW_HEAD_LENGTH * (angle + offset).sin(),
        )
    };
    surface.fill_polygon(&[tip, barb(-FRAC_PI_6), barb(FRAC_PI_6)], palette.direction_arrow);

    surface.stroke_arc(
        origin,
        ANGLE_ARC_RADIUS,
        0.0,
        angle,
        angle < 0.0,
        &Stroke::solid(palette.angle_arc, 2.0),
    );
    let arc_end = ScreenPoint::new(
        origin.x + ANGLE_ARC_RADIUS * angle.cos(),
        origin.y + ANGLE_ARC_RADIUS * angle.sin(),
    );
    surface.fill_circle(arc_end, 3.0, palette.angle_arc.with_alpha(1.0), None);

    let label = TextStyle::new(ANNOTATION_FONT, palette.direction_arrow);
    surface.fill_text(
        &format!("Angle: {:.1}°", indicator.label_degrees),
        ScreenPoint::new(origin.x + 25.0, origin.y - 5.0),
        &label,
    );
}
