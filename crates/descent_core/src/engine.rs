//! The optimizer engine: position, path and run state of one descent.

use crate::error::DescentError;
use crate::objective::{cost, derivative, is_converged, numerical_slope, slope_angle_degrees};
use crate::settings::DescentSettings;
use crate::solvers::PlannedStep;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Current point on the curve. `y` is always `cost(x)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn at(x: f64) -> Self {
        Self { x, y: cost(x) }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Snapshot taken before a step: the position and its raw gradient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub x: f64,
    pub y: f64,
    pub gradient: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    pub iteration: usize,
    pub running: bool,
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    MaxIterations,
    Cancelled,
    Converged,
    Diverged,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StopReason::MaxIterations => "max iterations",
            StopReason::Cancelled => "manually stopped",
            StopReason::Converged => "converged",
            StopReason::Diverged => "diverged",
        };
        f.write_str(label)
    }
}

/// Lifecycle of a run: `Idle → Running → Stopped(reason)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "reason", rename_all = "snake_case")]
pub enum RunPhase {
    Idle,
    Running,
    Stopped(StopReason),
}

/// Everything that happened during one applied step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub before: PathPoint,
    pub plan: PlannedStep,
    pub after: Position,
    /// Iteration count once the step has been applied.
    pub iteration: usize,
}

#[derive(Debug, Clone)]
pub struct Engine {
    position: Position,
    path: Vec<PathPoint>,
    run: RunState,
    stop_requested: bool,
    outcome: Option<StopReason>,
}

impl Engine {
    pub fn new(starting_x: f64) -> Self {
        Self {
            position: Position::at(starting_x),
            path: Vec::new(),
            run: RunState::default(),
            stop_requested: false,
            outcome: None,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn path(&self) -> &[PathPoint] {
        &self.path
    }

    pub fn run_state(&self) -> RunState {
        self.run
    }

    pub fn is_running(&self) -> bool {
        self.run.running
    }

    pub fn phase(&self) -> RunPhase {
        if self.run.running {
            RunPhase::Running
        } else {
            self.outcome.map_or(RunPhase::Idle, RunPhase::Stopped)
        }
    }

    pub fn is_converged(&self) -> bool {
        is_converged(self.position.x)
    }

    /// Moves back to `starting_x`, clears the path and leaves the run idle.
    pub fn reset(&mut self, starting_x: f64) {
        self.position = Position::at(starting_x);
        self.path.clear();
        self.run = RunState::default();
        self.stop_requested = false;
        self.outcome = None;
    }

    /// Moves the idle position without touching the path.
    ///
    /// Returns `false` and leaves the engine untouched while a run is active.
    pub fn reseed(&mut self, x: f64) -> bool {
        if self.run.running {
            return false;
        }
        self.position = Position::at(x);
        true
    }

    /// Begins a run. Returns `false` when one is already in progress.
    pub fn start(&mut self, settings: &DescentSettings) -> bool {
        if self.run.running {
            return false;
        }
        if self.path.is_empty() {
            self.position = Position::at(settings.starting_x);
        }
        self.run = RunState {
            iteration: 0,
            running: true,
        };
        self.stop_requested = false;
        self.outcome = None;
        log::info!(
            "starting descent at x = {:.4} (learning rate {}, at most {} iterations)",
            self.position.x,
            settings.learning_rate,
            settings.max_iterations
        );
        true
    }

    /// Requests a cooperative stop, observed by the next [`Engine::stop_reason`].
    ///
    /// The run stays `Running` until [`Engine::finish`] records the reason.
    pub fn cancel(&mut self) {
        if self.run.running {
            self.stop_requested = true;
        }
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested
    }

    /// The reason the next step must not be taken, if any.
    pub fn stop_reason(&self, settings: &DescentSettings) -> Option<StopReason> {
        if self.run.iteration >= settings.max_iterations {
            Some(StopReason::MaxIterations)
        } else if !self.run.running || self.stop_requested {
            Some(StopReason::Cancelled)
        } else if !self.position.x.is_finite() {
            Some(StopReason::Diverged)
        } else if is_converged(self.position.x) {
            Some(StopReason::Converged)
        } else {
            None
        }
    }

    pub fn should_stop(&self, settings: &DescentSettings) -> bool {
        self.stop_reason(settings).is_some()
    }

    /// Ends the current run with `reason`.
    pub fn finish(&mut self, reason: StopReason) {
        self.run.running = false;
        self.stop_requested = false;
        self.outcome = Some(reason);
        log::info!(
            "stopped after {} iterations at x = {:.4}: {reason}",
            self.run.iteration,
            self.position.x
        );
    }

    /// Applies one descent step using the settings as they are right now.
    pub fn step(&mut self, settings: &DescentSettings) -> Result<StepRecord, DescentError> {
        if let Some(reason) = self.stop_reason(settings) {
            return Err(DescentError::SteppedAfterStop(reason));
        }

        let x = self.position.x;
        let plan = settings.update_rule.plan(x, settings.learning_rate);
        let before = PathPoint {
            x,
            y: cost(x),
            gradient: plan.gradient,
        };
        self.path.push(before);
        log_step_diagnostics(self.run.iteration, &before, &plan, settings.learning_rate);

        self.position = Position::at(x - plan.applied_step);
        self.run.iteration += 1;

        Ok(StepRecord {
            before,
            plan,
            after: self.position,
            iteration: self.run.iteration,
        })
    }

    /// Derivative at the current position.
    pub fn current_gradient(&self) -> f64 {
        derivative(self.position.x)
    }
}

fn log_step_diagnostics(iteration: usize, before: &PathPoint, plan: &PlannedStep, base_rate: f64) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    log::debug!(
        "iteration {iteration}: position ({:.4}, {:.4})",
        before.x,
        before.y
    );
    log::debug!(
        "  analytical angle = {:.2}°, numerical angle = {:.2}°",
        slope_angle_degrees(before.gradient),
        slope_angle_degrees(numerical_slope(before.x))
    );
    if plan.gradient_clipped() {
        log::debug!(
            "  gradient clipped from {:.4} to {:.4}",
            plan.gradient,
            plan.clipped_gradient
        );
    }
    if plan.learning_rate != base_rate {
        log::debug!(
            "  learning rate adjusted from {base_rate:.4} to {:.4}",
            plan.learning_rate
        );
    }
    if plan.step_limited() {
        log::debug!(
            "  step size limited from {:.4} to {:.4}",
            plan.raw_step,
            plan.applied_step
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solvers::{UpdateRule, MAX_GRADIENT};
    use std::f64::consts::SQRT_2;

    fn settings(starting_x: f64, learning_rate: f64, max_iterations: usize) -> DescentSettings {
        DescentSettings {
            learning_rate,
            max_iterations,
            starting_x,
            update_rule: UpdateRule::Guarded,
        }
    }

    fn run_until_stopped(engine: &mut Engine, settings: &DescentSettings) -> StopReason {
        assert!(engine.start(settings));
        loop {
            if let Some(reason) = engine.stop_reason(settings) {
                engine.finish(reason);
                return reason;
            }
            engine.step(settings).expect("step should apply");
        }
    }

    #[test]
    fn step_records_raw_gradient_before_update() {
        for &x0 in &[-3.0, -1.2, 0.3, 0.9, 2.0, 2.7] {
            let settings = settings(x0, 0.05, 10);
            let mut engine = Engine::new(x0);
            engine.start(&settings);
            let record = engine.step(&settings).expect("step should apply");
            assert_eq!(record.before.x, x0);
            assert_eq!(record.before.y, cost(x0));
            assert_eq!(record.before.gradient, derivative(x0));
            assert_eq!(engine.path(), &[record.before]);
        }
    }

    #[test]
    fn steep_gradients_are_clipped_with_sign() {
        for &x0 in &[-2.5, 2.5, 3.0, -4.0] {
            assert!(derivative(x0).abs() > MAX_GRADIENT);
            let settings = settings(x0, 0.01, 10);
            let mut engine = Engine::new(x0);
            engine.start(&settings);
            let record = engine.step(&settings).expect("step should apply");
            assert_eq!(record.plan.clipped_gradient.abs(), MAX_GRADIENT);
            assert_eq!(
                record.plan.clipped_gradient.signum(),
                derivative(x0).signum()
            );
        }
    }

    #[test]
    fn no_step_moves_further_than_one_unit() {
        let settings = settings(-3.0, 2.0, 200);
        let mut engine = Engine::new(-3.0);
        engine.start(&settings);
        while !engine.should_stop(&settings) {
            let record = engine.step(&settings).expect("step should apply");
            assert!((record.after.x - record.before.x).abs() <= 1.0 + 1e-12);
        }
    }

    #[test]
    fn converges_to_positive_minimum() {
        let settings = settings(2.0, 0.01, 500);
        let mut engine = Engine::new(2.0);
        let reason = run_until_stopped(&mut engine, &settings);

        assert_eq!(reason, StopReason::Converged);
        assert_eq!(engine.phase(), RunPhase::Stopped(StopReason::Converged));
        assert!((engine.position().x - SQRT_2).abs() < 1e-3);
        assert!(engine.current_gradient().abs() < 0.001);
        assert_eq!(engine.path().len(), engine.run_state().iteration);
    }

    #[test]
    fn plain_rule_diverges_with_large_learning_rate() {
        let settings = DescentSettings {
            update_rule: UpdateRule::Plain,
            ..settings(2.0, 5.0, 50)
        };
        let mut engine = Engine::new(2.0);
        let reason = run_until_stopped(&mut engine, &settings);

        assert_eq!(reason, StopReason::Diverged);
        assert!(!engine.position().x.is_finite());
        assert!(engine.run_state().iteration < 10);
    }

    #[test]
    fn guarded_rule_stays_bounded_with_large_learning_rate() {
        let settings = settings(2.0, 5.0, 50);
        let mut engine = Engine::new(2.0);
        let reason = run_until_stopped(&mut engine, &settings);

        assert_eq!(reason, StopReason::MaxIterations);
        assert!(engine.path().iter().all(|p| p.x == 1.0 || p.x == 2.0));
    }

    #[test]
    fn non_finite_start_reports_divergence() {
        let settings = settings(f64::INFINITY, 0.01, 50);
        let mut engine = Engine::new(0.0);
        engine.start(&settings);
        assert_eq!(engine.stop_reason(&settings), Some(StopReason::Diverged));
    }

    #[test]
    fn stepping_after_stop_is_rejected() {
        let settings = settings(2.0, 0.01, 1);
        let mut engine = Engine::new(2.0);
        engine.start(&settings);
        engine.step(&settings).expect("first step should apply");

        let err = engine.step(&settings).expect_err("cap reached");
        assert_eq!(err, DescentError::SteppedAfterStop(StopReason::MaxIterations));
        assert_eq!(engine.path().len(), 1);
    }

    #[test]
    fn idle_engine_refuses_to_step() {
        let settings = settings(2.0, 0.01, 10);
        let mut engine = Engine::new(2.0);
        let err = engine.step(&settings).expect_err("not running");
        assert_eq!(err, DescentError::SteppedAfterStop(StopReason::Cancelled));
    }

    #[test]
    fn cancellation_is_reported_before_convergence_checks() {
        let settings = settings(2.0, 0.01, 10);
        let mut engine = Engine::new(2.0);
        engine.start(&settings);
        engine.step(&settings).expect("step should apply");
        engine.cancel();
        assert_eq!(engine.stop_reason(&settings), Some(StopReason::Cancelled));
    }

    #[test]
    fn cancelled_run_stays_running_until_finished() {
        let settings = settings(2.0, 0.01, 10);
        let mut engine = Engine::new(2.0);
        engine.start(&settings);
        engine.step(&settings).expect("step should apply");
        engine.cancel();

        assert_eq!(engine.phase(), RunPhase::Running);
        assert!(engine.is_running());
        assert!(engine.is_stop_requested());
        let err = engine.step(&settings).expect_err("stop requested");
        assert_eq!(err, DescentError::SteppedAfterStop(StopReason::Cancelled));

        let reason = engine.stop_reason(&settings).expect("cancel observed");
        engine.finish(reason);
        assert_eq!(engine.phase(), RunPhase::Stopped(StopReason::Cancelled));
        assert!(!engine.is_stop_requested());
    }

    #[test]
    fn cancelling_an_idle_engine_changes_nothing() {
        let mut engine = Engine::new(2.0);
        engine.cancel();
        assert!(!engine.is_stop_requested());
        assert_eq!(engine.phase(), RunPhase::Idle);
    }

    #[test]
    fn learning_rate_changes_apply_to_next_step() {
        let mut settings = settings(0.5, 0.01, 10);
        let mut engine = Engine::new(0.5);
        engine.start(&settings);
        let slow = engine.step(&settings).expect("step should apply");
        settings.learning_rate = 0.1;
        let fast = engine.step(&settings).expect("step should apply");
        assert_eq!(slow.plan.learning_rate, 0.01);
        assert_eq!(fast.plan.learning_rate, 0.1);
    }

    #[test]
    fn reset_restores_initial_state() {
        let settings = settings(2.0, 0.01, 20);
        let mut engine = Engine::new(2.0);
        run_until_stopped(&mut engine, &settings);

        engine.reset(-0.75);
        assert_eq!(engine.run_state(), RunState::default());
        assert!(engine.path().is_empty());
        assert_eq!(engine.position(), Position::at(-0.75));
        assert_eq!(engine.position().y, cost(-0.75));
        assert_eq!(engine.phase(), RunPhase::Idle);
    }

    #[test]
    fn restart_keeps_position_when_path_exists() {
        let settings = settings(2.0, 0.01, 3);
        let mut engine = Engine::new(2.0);
        run_until_stopped(&mut engine, &settings);
        let stopped_at = engine.position();

        assert!(engine.start(&settings));
        assert_eq!(engine.position(), stopped_at);
        assert_eq!(engine.run_state().iteration, 0);
        assert!(!engine.start(&settings), "second start is a no-op");
    }

    #[test]
    fn reseed_only_moves_idle_engine() {
        let settings = settings(2.0, 0.01, 3);
        let mut engine = Engine::new(2.0);
        assert!(engine.reseed(1.0));
        assert_eq!(engine.position().x, 1.0);

        engine.start(&settings);
        assert!(!engine.reseed(0.5));
    }
}
