//! WASM bindings for the gradient descent visualizer.
//!
//! `visualizer` holds the exported type; the other modules adapt the
//! browser (canvas, console, info panel callback) to the core traits.

mod canvas;
mod logging;
mod panel;
mod visualizer;

pub use canvas::CanvasSurface;
pub use panel::{PanelSink, PanelState};
pub use visualizer::WasmDescentVisualizer;
