use crate::engine::StopReason;
use thiserror::Error;

/// Errors surfaced by the engine and the runner.
///
/// Divergence and cancellation are not errors: they end a run through a
/// [`StopReason`]. The variants here are contract violations and bad input
/// that a host should report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DescentError {
    #[error("cannot step a stopped run ({0})")]
    SteppedAfterStop(StopReason),
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),
}
