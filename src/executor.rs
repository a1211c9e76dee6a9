//! The executor contract consumed by the wheel.
//!
//! The wheel never runs a callback itself; firing means handing the
//! callback to whatever [`Executor`] the timer was scheduled with. This
//! module defines that contract plus the one trivial implementation the
//! wheel ships with ([`DirectExecutor`]); see [`crate::pool`] for the
//! work-stealing pool executor.

use crate::error::ExecutorError;

/// Something that accepts a zero-argument callback and eventually runs it.
///
/// An executor may run the callback synchronously on the submitting thread
/// ("direct"), on a dedicated pool, or on a single-thread loop. A non-fatal
/// `Err` returned from `execute` is forwarded to the wheel's fault hook; the
/// timer is still considered dispatched and will not be retried. A panic
/// unwinding out of `execute` is fatal and is not caught here.
pub trait Executor: Send + Sync {
    /// Hand `task` off for execution. Must not block for long, since the
    /// wheel calls this from its own worker thread loop.
    fn execute(&self, task: Box<dyn FnOnce() + Send + 'static>) -> Result<(), ExecutorError>;
}

/// An executor that runs the callback inline, synchronously, on whichever
/// thread calls `execute` — the wheel's worker thread, when used via
/// [`TimerWheel::schedule_direct`](crate::TimerWheel::schedule_direct).
///
/// Reserved for very short, non-blocking work: a callback that blocks or
/// panics here blocks or kills the wheel's worker thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectExecutor;

impl Executor for DirectExecutor {
    fn execute(&self, task: Box<dyn FnOnce() + Send + 'static>) -> Result<(), ExecutorError> {
        task();
        Ok(())
    }
}
