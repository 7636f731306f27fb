//! Drives the engine one scheduled tick at a time and keeps the view in sync.
//!
//! The runner owns every piece of mutable state. Host callbacks (buttons,
//! sliders, timers) are thin adapters over its `on_*` methods and [`tick`],
//! and each of them receives the scheduling capability explicitly, so a run
//! can be driven synchronously in tests or by browser timers alike.
//!
//! [`tick`]: DescentRunner::tick

use crate::display::DisplayState;
use crate::engine::{Engine, RunPhase, StepRecord, StopReason};
use crate::error::DescentError;
use crate::render::style::Palette;
use crate::render::{render, Scene};
use crate::schedule::TickQueue;
use crate::settings::{DescentSettings, Parameter, RunnerOptions};
use crate::traits::{DisplaySink, DrawSurface, Scheduler, TickId};
use crate::viewport::ViewState;
use std::time::Duration;

/// Result of delivering one tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// A step was applied and the next tick scheduled.
    Stepped(StepRecord),
    /// The run ended before stepping; nothing further is scheduled.
    Finished(StopReason),
    /// The tick was cancelled or superseded and has been ignored.
    Stale,
}

pub struct DescentRunner<S: DrawSurface, D: DisplaySink> {
    engine: Engine,
    settings: DescentSettings,
    view: ViewState,
    options: RunnerOptions,
    palette: Palette,
    surface: S,
    sink: D,
    pending: Option<TickId>,
}

impl<S: DrawSurface, D: DisplaySink> DescentRunner<S, D> {
    pub fn new(settings: DescentSettings, options: RunnerOptions, surface: S, sink: D) -> Self {
        let settings = settings.sanitized();
        Self {
            engine: Engine::new(settings.starting_x),
            settings,
            view: ViewState::default(),
            options,
            palette: Palette::default(),
            surface,
            sink,
            pending: None,
        }
    }

    pub fn with_view(mut self, view: ViewState) -> Self {
        self.view = view;
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn settings(&self) -> &DescentSettings {
        &self.settings
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn sink(&self) -> &D {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut D {
        &mut self.sink
    }

    pub fn phase(&self) -> RunPhase {
        self.engine.phase()
    }

    pub fn pending_tick(&self) -> Option<TickId> {
        self.pending
    }

    pub fn display_state(&self) -> DisplayState {
        DisplayState::from_engine(&self.engine)
    }

    /// Reports the display state and redraws the frame.
    pub fn refresh(&mut self) {
        self.report();
        self.redraw();
    }

    /// Starts a run. Returns `false` when one is already in progress.
    pub fn on_start(&mut self, scheduler: &mut impl Scheduler) -> bool {
        if !self.engine.start(&self.settings) {
            return false;
        }
        if let Some(stale) = self.pending.take() {
            scheduler.cancel(stale);
        }
        self.pending = Some(scheduler.schedule(Duration::ZERO));
        self.refresh();
        true
    }

    /// Requests a manual stop, observed at the next tick.
    pub fn on_cancel(&mut self) {
        if self.engine.is_running() {
            log::info!("stop requested at iteration {}", self.engine.run_state().iteration);
            self.engine.cancel();
        }
    }

    /// Cancels any pending tick and returns to the starting point.
    pub fn on_reset(&mut self, scheduler: &mut impl Scheduler) {
        if let Some(pending) = self.pending.take() {
            scheduler.cancel(pending);
        }
        self.engine.reset(self.settings.starting_x);
        log::info!("reset to x = {}", self.settings.starting_x);
        self.refresh();
    }

    pub fn on_zoom_in(&mut self) {
        self.view.zoom_in();
        self.redraw();
    }

    pub fn on_zoom_out(&mut self) {
        self.view.zoom_out();
        self.redraw();
    }

    /// Applies a new control value. Invalid values fall back to defaults.
    pub fn on_parameter_change(&mut self, parameter: Parameter, value: f64) {
        let value = parameter.validate(value);
        match parameter {
            Parameter::LearningRate => self.settings.learning_rate = value,
            Parameter::MaxIterations => self.settings.max_iterations = value.floor() as usize,
            Parameter::StartingX => {
                self.settings.starting_x = value;
                if self.engine.reseed(value) {
                    self.refresh();
                }
            }
            Parameter::Zoom => {
                self.view.set_zoom(value);
                self.redraw();
            }
            Parameter::PanX => {
                self.view.pan_x = value;
                self.redraw();
            }
        }
    }

    /// Applies raw control text to the parameter called `name`.
    pub fn on_parameter_input(&mut self, name: &str, raw: &str) -> Result<(), DescentError> {
        let parameter: Parameter = name.parse()?;
        let value = parameter.parse_value(raw);
        self.on_parameter_change(parameter, value);
        Ok(())
    }

    /// Delivers tick `id`: checks the stop conditions, then steps, reports,
    /// renders and schedules the next tick.
    pub fn tick(
        &mut self,
        id: TickId,
        scheduler: &mut impl Scheduler,
    ) -> Result<TickOutcome, DescentError> {
        if self.pending != Some(id) {
            log::warn!("ignoring stale tick {}", id.0);
            return Ok(TickOutcome::Stale);
        }
        self.pending = None;

        if let Some(reason) = self.engine.stop_reason(&self.settings) {
            self.engine.finish(reason);
            self.refresh();
            return Ok(TickOutcome::Finished(reason));
        }

        let record = self.engine.step(&self.settings)?;
        self.refresh();
        self.pending = Some(scheduler.schedule(self.options.frame_delay));
        Ok(TickOutcome::Stepped(record))
    }

    /// Delivers queued ticks immediately until the run ends.
    ///
    /// Returns `None` when the queue runs dry without a run finishing.
    pub fn run_to_completion(
        &mut self,
        queue: &mut TickQueue,
    ) -> Result<Option<StopReason>, DescentError> {
        while let Some(request) = queue.next_due() {
            if let TickOutcome::Finished(reason) = self.tick(request.tick_id(), queue)? {
                return Ok(Some(reason));
            }
        }
        Ok(None)
    }

    fn report(&mut self) {
        let state = DisplayState::from_engine(&self.engine);
        self.sink.display_state(&state);
    }

    fn redraw(&mut self) {
        let scene = Scene {
            engine: &self.engine,
            settings: &self.settings,
            view: &self.view,
        };
        render(&mut self.surface, &scene, &self.palette);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::recording::{DrawCommand, RecordingSurface};
    use std::f64::consts::SQRT_2;

    type TestRunner = DescentRunner<RecordingSurface, Vec<DisplayState>>;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn runner(starting_x: f64, learning_rate: f64, max_iterations: usize) -> TestRunner {
        init_logging();
        let settings = DescentSettings {
            learning_rate,
            max_iterations,
            starting_x,
            ..DescentSettings::default()
        };
        DescentRunner::new(
            settings,
            RunnerOptions::default(),
            RecordingSurface::new(800.0, 500.0),
            Vec::new(),
        )
    }

    #[test]
    fn run_converges_through_scheduled_ticks() {
        let mut runner = runner(2.0, 0.01, 500);
        let mut queue = TickQueue::new();
        assert!(runner.on_start(&mut queue));

        let reason = runner
            .run_to_completion(&mut queue)
            .expect("run should not violate the step contract");
        assert_eq!(reason, Some(StopReason::Converged));

        let last = runner.sink().last().expect("final state reported");
        assert!(last.converged);
        assert_eq!(last.phase, RunPhase::Stopped(StopReason::Converged));
        assert!((last.x - SQRT_2).abs() < 1e-3);
        assert!(queue.is_empty());
        assert_eq!(runner.pending_tick(), None);
    }

    #[test]
    fn each_step_schedules_exactly_one_follow_up() {
        let mut runner = runner(2.0, 0.01, 50);
        let mut queue = TickQueue::new();
        runner.on_start(&mut queue);

        let mut request = queue.next_due().expect("first tick");
        assert_eq!(request.delay_ms, 0);
        for _ in 0..3 {
            let outcome = runner.tick(request.tick_id(), &mut queue).expect("tick");
            assert!(matches!(outcome, TickOutcome::Stepped(_)));
            assert_eq!(queue.len(), 1);
            request = queue.next_due().expect("follow-up tick");
            assert_eq!(request.delay_ms, 3000);
        }
    }

    #[test]
    fn every_step_is_reported_and_rendered() {
        let mut runner = runner(2.0, 0.01, 4);
        let mut queue = TickQueue::new();
        runner.on_start(&mut queue);
        let reason = runner.run_to_completion(&mut queue).expect("run");

        assert_eq!(reason, Some(StopReason::MaxIterations));
        let iterations: Vec<usize> = runner.sink().iter().map(|s| s.iteration).collect();
        assert_eq!(iterations, vec![0, 1, 2, 3, 4, 4]);
        assert_eq!(runner.surface().commands.first(), Some(&DrawCommand::Clear));
    }

    #[test]
    fn reset_cancels_pending_tick() {
        let mut runner = runner(2.0, 0.01, 50);
        let mut queue = TickQueue::new();
        runner.on_start(&mut queue);
        let first = queue.next_due().expect("first tick");
        runner.tick(first.tick_id(), &mut queue).expect("tick");
        let in_flight = queue.pending()[0];

        let reports = runner.sink().len();
        runner.on_reset(&mut queue);
        assert!(queue.is_empty());
        assert_eq!(runner.sink().len(), reports + 1);
        let shown = runner.sink().last().expect("reset is reported");
        assert_eq!(shown.iteration, 0);
        assert_eq!(shown.x, 2.0);
        assert_eq!(shown.phase, RunPhase::Idle);
        assert_eq!(runner.engine().run_state().iteration, 0);
        assert!(runner.engine().path().is_empty());
        assert_eq!(runner.phase(), RunPhase::Idle);

        let outcome = runner.tick(in_flight.tick_id(), &mut queue).expect("tick");
        assert_eq!(outcome, TickOutcome::Stale);
        assert!(runner.engine().path().is_empty());
    }

    #[test]
    fn cancellation_takes_effect_at_next_tick() {
        let mut runner = runner(2.0, 0.01, 50);
        let mut queue = TickQueue::new();
        runner.on_start(&mut queue);
        let first = queue.next_due().expect("first tick");
        runner.tick(first.tick_id(), &mut queue).expect("tick");

        runner.on_cancel();
        assert_eq!(runner.phase(), RunPhase::Running);
        assert_eq!(queue.len(), 1);
        let reason = runner.run_to_completion(&mut queue).expect("run");
        assert_eq!(reason, Some(StopReason::Cancelled));
        assert_eq!(runner.engine().path().len(), 1);
        assert_eq!(runner.phase(), RunPhase::Stopped(StopReason::Cancelled));
    }

    #[test]
    fn second_start_while_running_is_ignored() {
        let mut runner = runner(2.0, 0.01, 50);
        let mut queue = TickQueue::new();
        assert!(runner.on_start(&mut queue));
        assert!(!runner.on_start(&mut queue));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn view_changes_redraw_without_touching_engine() {
        let mut runner = runner(2.0, 0.01, 50);
        let mut queue = TickQueue::new();
        runner.on_start(&mut queue);
        let first = queue.next_due().expect("first tick");
        runner.tick(first.tick_id(), &mut queue).expect("tick");

        let position = runner.engine().position();
        let reports = runner.sink().len();
        runner.on_zoom_in();
        runner
            .on_parameter_input("pan-x", "0.5")
            .expect("pan is a known parameter");

        assert_eq!(runner.view().zoom_level(), 1.5);
        assert_eq!(runner.view().pan_x, 0.5);
        assert_eq!(runner.engine().position(), position);
        assert_eq!(runner.sink().len(), reports);
        assert_eq!(runner.surface().commands.first(), Some(&DrawCommand::Clear));
    }

    #[test]
    fn learning_rate_change_reaches_in_flight_run() {
        let mut runner = runner(0.5, 0.01, 50);
        let mut queue = TickQueue::new();
        runner.on_start(&mut queue);
        let first = queue.next_due().expect("first tick");
        runner.tick(first.tick_id(), &mut queue).expect("tick");

        runner
            .on_parameter_input("learning-rate", "0.2")
            .expect("known parameter");
        let next = queue.next_due().expect("follow-up tick");
        match runner.tick(next.tick_id(), &mut queue).expect("tick") {
            TickOutcome::Stepped(record) => assert_eq!(record.plan.learning_rate, 0.2),
            other => panic!("expected a step, got {other:?}"),
        }
    }

    #[test]
    fn lowering_iteration_cap_stops_in_flight_run() {
        let mut runner = runner(2.0, 0.01, 50);
        let mut queue = TickQueue::new();
        runner.on_start(&mut queue);
        let first = queue.next_due().expect("first tick");
        runner.tick(first.tick_id(), &mut queue).expect("tick");

        runner.on_parameter_change(Parameter::MaxIterations, 1.0);
        let reason = runner.run_to_completion(&mut queue).expect("run");
        assert_eq!(reason, Some(StopReason::MaxIterations));
    }

    #[test]
    fn idle_starting_point_change_moves_position() {
        let mut runner = runner(2.0, 0.01, 50);
        runner
            .on_parameter_input("starting-point", "-1.0")
            .expect("known parameter");

        assert_eq!(runner.engine().position().x, -1.0);
        assert_eq!(runner.settings().starting_x, -1.0);
        let last = runner.sink().last().expect("reseed is reported");
        assert_eq!(last.x, -1.0);
    }

    #[test]
    fn starting_point_change_during_run_waits_for_reset() {
        let mut runner = runner(2.0, 0.01, 50);
        let mut queue = TickQueue::new();
        runner.on_start(&mut queue);
        runner.on_parameter_change(Parameter::StartingX, -1.0);
        assert_eq!(runner.engine().position().x, 2.0);

        runner.on_reset(&mut queue);
        assert_eq!(runner.engine().position().x, -1.0);
        let shown = runner.sink().last().expect("reset is reported");
        assert_eq!(shown.iteration, 0);
        assert_eq!(shown.x, -1.0);
    }

    #[test]
    fn unknown_parameter_is_an_error() {
        let mut runner = runner(2.0, 0.01, 50);
        let err = runner
            .on_parameter_input("momentum", "0.9")
            .expect_err("unknown parameter");
        assert_eq!(err, DescentError::UnknownParameter("momentum".to_string()));
    }

    #[test]
    fn invalid_learning_rate_falls_back_to_default() {
        let mut runner = runner(2.0, 0.3, 50);
        runner
            .on_parameter_input("learning-rate", "fast")
            .expect("known parameter");
        assert_eq!(runner.settings().learning_rate, 0.01);
    }
}
