//! Error types for the timer wheel.

use thiserror::Error;

/// Errors that can occur while constructing a [`TimerWheel`](crate::TimerWheel).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The wheel must have at least one spoke.
    #[error("wheel size must be greater than zero")]
    ZeroWheelSize,

    /// The tick duration must advance the wheel.
    #[error("tick duration must be greater than zero")]
    ZeroTickDuration,
}

/// Errors that can occur while scheduling a timer.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The wheel's worker has already been shut down.
    #[error("timer wheel is not running")]
    NotRunning,
}

/// A non-fatal failure to hand a fired callback off to its executor.
///
/// This is reported to the [`FaultHook`](crate::fault::FaultHook); it does not
/// fail the `schedule` call that registered the timer, since by the time an
/// executor submission fails the timer has already fired.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// The executor rejected the task, e.g. because it has been shut down.
    #[error("executor rejected task: {0}")]
    Rejected(String),
}
