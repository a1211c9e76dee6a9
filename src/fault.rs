//! The fault hook extension point.
//!
//! Invoked whenever a fired timer's executor rejects the submission. The
//! timer has already fired at that point — there is nothing to retry — so
//! this is purely a reporting hook, not a recovery mechanism.

use crate::error::ExecutorError;

/// Overridable reporting hook for non-fatal executor submission failures.
pub trait FaultHook: Send + Sync {
    /// Called on the worker thread immediately after `Executor::execute`
    /// returns an error.
    fn on_non_fatal(&self, error: &ExecutorError);
}

/// Default fault hook: logs at `error` level via `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingFaultHook;

impl FaultHook for TracingFaultHook {
    fn on_non_fatal(&self, error: &ExecutorError) {
        tracing::error!(%error, "timer executor rejected a fired callback");
    }
}
