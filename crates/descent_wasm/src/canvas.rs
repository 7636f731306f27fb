//! `DrawSurface` backed by an HTML canvas 2D context.

use anyhow::{anyhow, Result};
use descent_core::render::style::{Color, Stroke, TextAlign, TextBaseline, TextStyle};
use descent_core::traits::DrawSurface;
use descent_core::viewport::ScreenPoint;
use js_sys::Array;
use std::f64::consts::TAU;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| anyhow!("Canvas context request failed: {:?}", e))?
            .ok_or_else(|| anyhow!("Canvas has no 2d context."))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| anyhow!("Canvas context is not a CanvasRenderingContext2d."))?;
        Ok(Self { canvas, ctx })
    }

    fn apply_stroke(&self, stroke: &Stroke) {
        self.ctx.set_stroke_style_str(&stroke.color.to_string());
        self.ctx.set_line_width(stroke.width);
        let dash: Array = stroke.dash.iter().map(|&d| JsValue::from_f64(d)).collect();
        warn_on_error("setLineDash", self.ctx.set_line_dash(&dash));
    }

    fn trace(&self, points: &[ScreenPoint]) -> bool {
        let Some((first, rest)) = points.split_first() else {
            return false;
        };
        self.ctx.begin_path();
        self.ctx.move_to(first.x, first.y);
        for point in rest {
            self.ctx.line_to(point.x, point.y);
        }
        true
    }
}

fn warn_on_error(call: &str, result: Result<(), JsValue>) {
    if let Err(e) = result {
        log::warn!("canvas {call} failed: {:?}", e);
    }
}

fn align_name(align: TextAlign) -> &'static str {
    match align {
        TextAlign::Left => "left",
        TextAlign::Center => "center",
    }
}

fn baseline_name(baseline: TextBaseline) -> &'static str {
    match baseline {
        TextBaseline::Alphabetic => "alphabetic",
        TextBaseline::Top => "top",
    }
}

impl DrawSurface for CanvasSurface {
    fn size(&self) -> (f64, f64) {
        (self.canvas.width() as f64, self.canvas.height() as f64)
    }

    fn clear(&mut self) {
        let (width, height) = self.size();
        self.ctx.clear_rect(0.0, 0.0, width, height);
    }

    fn stroke_polyline(&mut self, points: &[ScreenPoint], stroke: &Stroke) {
        if points.len() < 2 || !self.trace(points) {
            return;
        }
        self.apply_stroke(stroke);
        self.ctx.stroke();
    }

    fn fill_circle(
        &mut self,
        center: ScreenPoint,
        radius: f64,
        fill: Color,
        outline: Option<&Stroke>,
    ) {
        self.ctx.begin_path();
        warn_on_error("arc", self.ctx.arc(center.x, center.y, radius, 0.0, TAU));
        self.ctx.set_fill_style_str(&fill.to_string());
        self.ctx.fill();
        if let Some(stroke) = outline {
            self.apply_stroke(stroke);
            self.ctx.stroke();
        }
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
        self.ctx.begin_path();
        warn_on_error(
            "arc",
            self.ctx
                .arc_with_anticlockwise(center.x, center.y, radius, start, end, anticlockwise),
        );
        self.apply_stroke(stroke);
        self.ctx.stroke();
    }

    fn fill_polygon(&mut self, points: &[ScreenPoint], fill: Color) {
        if !self.trace(points) {
            return;
        }
        self.ctx.close_path();
        self.ctx.set_fill_style_str(&fill.to_string());
        self.ctx.fill();
    }

    fn fill_text(&mut self, text: &str, at: ScreenPoint, style: &TextStyle) {
        self.ctx.set_font(&style.font);
        self.ctx.set_fill_style_str(&style.color.to_string());
        self.ctx.set_text_align(align_name(style.align));
        self.ctx.set_text_baseline(baseline_name(style.baseline));
        warn_on_error("fillText", self.ctx.fill_text(text, at.x, at.y));
    }
}
