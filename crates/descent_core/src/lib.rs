pub mod display;
pub mod engine;
pub mod error;
pub mod objective;
pub mod render;
pub mod runner;
pub mod schedule;
pub mod settings;
pub mod solvers;
pub mod viewport;
/// The `descent_core` crate is the engine behind the gradient descent
/// visualizer. It minimizes the fixed non-convex cost `x⁴ − 4x² + 5` one
/// scheduled step at a time and draws the trajectory.
///
/// Key components:
/// - **Engine**: position, append-only path and run state, with the guarded
///   update rule (gradient clipping, adaptive learning rate, step limiting).
/// - **Viewport & Renderer**: the zoom/pan affine map and the frame drawn onto
///   any `DrawSurface`.
/// - **Runner**: the `Idle → Running → Stopped` state machine, driven through
///   a `Scheduler` so it runs the same under browser timers and in tests.
/// - **Traits**: `DrawSurface`, `DisplaySink` and `Scheduler`, the seams to the host.
pub mod traits;
