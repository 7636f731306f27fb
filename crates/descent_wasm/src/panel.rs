//! Display sink that forwards state to a JavaScript callback.

use descent_core::display::DisplayState;
use descent_core::engine::RunPhase;
use descent_core::traits::DisplaySink;
use serde::Serialize;
use serde_wasm_bindgen::to_value;
use wasm_bindgen::JsValue;

/// What the info panel shows, with numbers already formatted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelState {
    pub iteration: usize,
    pub x: String,
    pub cost: String,
    pub derivative: String,
    pub converged: bool,
    pub phase: RunPhase,
}

impl From<&DisplayState> for PanelState {
    fn from(state: &DisplayState) -> Self {
        let [x, cost, derivative] = state.formatted();
        Self {
            iteration: state.iteration,
            x,
            cost,
            derivative,
            converged: state.converged,
            phase: state.phase,
        }
    }
}

pub struct PanelSink {
    callback: Option<js_sys::Function>,
    last: Option<DisplayState>,
}

impl PanelSink {
    pub fn new(callback: Option<js_sys::Function>) -> Self {
        Self {
            callback,
            last: None,
        }
    }

    pub fn last(&self) -> Option<&DisplayState> {
        self.last.as_ref()
    }
}

impl DisplaySink for PanelSink {
    fn display_state(&mut self, state: &DisplayState) {
        self.last = Some(state.clone());
        let Some(callback) = &self.callback else {
            return;
        };
        let payload = match to_value(&PanelState::from(state)) {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("panel serialization failed: {}", e);
                return;
            }
        };
        if let Err(e) = callback.call1(&JsValue::NULL, &payload) {
            log::warn!("panel callback failed: {:?}", e);
        }
    }
}
