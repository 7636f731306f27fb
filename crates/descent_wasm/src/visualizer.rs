//! WASM-exported gradient descent visualizer.
//!
//! JavaScript owns the timer: every call that may schedule work returns the
//! next tick request (`{ id, delay_ms }` or `null`), and the page answers it
//! with `setTimeout(() => vis.tick(id), delay_ms)`. Ticks made obsolete by a
//! reset are recognised by id and ignored.

use crate::canvas::CanvasSurface;
use crate::logging;
use crate::panel::{PanelSink, PanelState};
use anyhow::{Context, Result};
use descent_core::engine::{RunPhase, StopReason};
use descent_core::runner::{DescentRunner, TickOutcome};
use descent_core::schedule::{TickQueue, TickRequest};
use descent_core::settings::{DescentSettings, RunnerOptions};
use descent_core::traits::TickId;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use std::time::Duration;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

/// Payload returned from [`WasmDescentVisualizer::tick`].
#[derive(Serialize)]
struct TickProgress {
    outcome: &'static str,
    stop_reason: Option<StopReason>,
    phase: RunPhase,
    display: PanelState,
    next_tick: Option<TickRequest>,
}

#[wasm_bindgen]
pub struct WasmDescentVisualizer {
    runner: DescentRunner<CanvasSurface, PanelSink>,
    queue: TickQueue,
}

pub(crate) fn parse_settings(value: JsValue) -> Result<DescentSettings> {
    if value.is_undefined() || value.is_null() {
        return Ok(DescentSettings::default());
    }
    from_value(value)
        .map_err(|e| anyhow::anyhow!("{}", e))
        .context("Invalid settings")
}

fn to_js_error(err: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{:#}", err))
}

fn serialize<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    to_value(value).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

impl WasmDescentVisualizer {
    /// Hands the next pending tick over to the page.
    fn next_request(&mut self) -> Result<JsValue, JsValue> {
        let request = self.queue.next_due();
        serialize(&request)
    }
}

#[wasm_bindgen]
impl WasmDescentVisualizer {
    /// Binds a visualizer to `canvas` and draws the initial frame.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas: HtmlCanvasElement,
        settings_val: JsValue,
        on_display: Option<js_sys::Function>,
        frame_delay_ms: Option<u32>,
        log_level: Option<String>,
    ) -> Result<WasmDescentVisualizer, JsValue> {
        console_error_panic_hook::set_once();
        logging::init(logging::parse_level(log_level));

        let settings = parse_settings(settings_val).map_err(to_js_error)?;
        let surface = CanvasSurface::new(canvas).map_err(to_js_error)?;
        let mut options = RunnerOptions::default();
        if let Some(ms) = frame_delay_ms {
            options.frame_delay = Duration::from_millis(ms as u64);
        }

        let mut runner = DescentRunner::new(settings, options, surface, PanelSink::new(on_display));
        runner.refresh();

        Ok(WasmDescentVisualizer {
            runner,
            queue: TickQueue::new(),
        })
    }

    pub fn start(&mut self) -> Result<JsValue, JsValue> {
        self.runner.on_start(&mut self.queue);
        self.next_request()
    }

    pub fn stop(&mut self) -> Result<JsValue, JsValue> {
        self.runner.on_cancel();
        self.next_request()
    }

    pub fn reset(&mut self) -> Result<JsValue, JsValue> {
        self.runner.on_reset(&mut self.queue);
        self.next_request()
    }

    pub fn zoom_in(&mut self) -> Result<JsValue, JsValue> {
        self.runner.on_zoom_in();
        self.next_request()
    }

    pub fn zoom_out(&mut self) -> Result<JsValue, JsValue> {
        self.runner.on_zoom_out();
        self.next_request()
    }

    /// Applies raw control text, e.g. `set_parameter("learning-rate", "0.05")`.
    pub fn set_parameter(&mut self, name: &str, raw: &str) -> Result<JsValue, JsValue> {
        self.runner
            .on_parameter_input(name, raw)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.next_request()
    }

    /// Delivers tick `id` and reports progress.
    pub fn tick(&mut self, id: f64) -> Result<JsValue, JsValue> {
        let outcome = self
            .runner
            .tick(TickId(id as u64), &mut self.queue)
            .context("Tick failed")
            .map_err(to_js_error)?;

        let (outcome, stop_reason) = match outcome {
            TickOutcome::Stepped(_) => ("stepped", None),
            TickOutcome::Finished(reason) => ("finished", Some(reason)),
            TickOutcome::Stale => ("stale", None),
        };
        let progress = TickProgress {
            outcome,
            stop_reason,
            phase: self.runner.phase(),
            display: PanelState::from(&self.runner.display_state()),
            next_tick: self.queue.next_due(),
        };
        serialize(&progress)
    }

    pub fn is_running(&self) -> bool {
        self.runner.engine().is_running()
    }

    pub fn display_state(&self) -> Result<JsValue, JsValue> {
        serialize(&PanelState::from(&self.runner.display_state()))
    }

    pub fn zoom_level(&self) -> f64 {
        self.runner.view().zoom_level()
    }

    pub fn settings(&self) -> Result<JsValue, JsValue> {
        serialize(self.runner.settings())
    }

    pub fn path(&self) -> Result<JsValue, JsValue> {
        serialize(&self.runner.engine().path())
    }
}
