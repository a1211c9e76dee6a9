//! Timer nodes — the intrusive cell carried through the wheel.
//!
//! A node is reference-counted ([`Arc`]) rather than managed through raw
//! intrusive pointers: the wheel's single-writer discipline (only the worker
//! thread ever touches bucket membership) is expressed directly through Rust
//! ownership — buckets are `VecDeque<Arc<TimerNode>>` that never leave the
//! worker thread — instead of through unsafe prev/next pointers. See
//! `DESIGN.md` for the rationale.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use crate::executor::Executor;
use crate::fault::FaultHook;

type Callback = Box<dyn FnOnce() + Send + 'static>;

/// A single scheduled timer.
///
/// Carries the callback, the executor it must be dispatched on, its absolute
/// expiry, and a cancellation flag. A node is registered into at most one
/// bucket at a time and is never dispatched more than once.
pub(crate) struct TimerNode {
    expiry: Instant,
    canceled: AtomicBool,
    fired: AtomicBool,
    executor: Arc<dyn Executor>,
    callback: Mutex<Option<Callback>>,
}

impl TimerNode {
    pub(crate) fn new(expiry: Instant, executor: Arc<dyn Executor>, callback: Callback) -> Self {
        Self {
            expiry,
            canceled: AtomicBool::new(false),
            fired: AtomicBool::new(false),
            executor,
            callback: Mutex::new(Some(callback)),
        }
    }

    #[inline]
    pub(crate) fn expiry(&self) -> Instant {
        self.expiry
    }

    /// Mark this node canceled. Safe to call from any thread, any number of
    /// times. Does not by itself unlink the node from a bucket; that happens
    /// when the worker drains the corresponding `Cancel` event.
    #[inline]
    pub(crate) fn mark_canceled(&self) {
        self.canceled.store(true, Ordering::Release);
    }

    #[inline]
    pub(crate) fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::Acquire)
    }

    /// Submit the callback to its executor. Worker-only; idempotent against
    /// double-fire because `fired` is only ever flipped once and `callback`
    /// is taken exactly once.
    pub(crate) fn fire(&self, fault_hook: &dyn FaultHook) {
        if self.fired.swap(true, Ordering::AcqRel) {
            return;
        }
        let Some(callback) = self.callback.lock().take() else {
            return;
        };
        match self.executor.execute(callback) {
            Ok(()) => tracing::trace!(expiry = ?self.expiry, "fired timer node"),
            Err(err) => fault_hook.on_non_fatal(&err),
        }
    }
}

impl std::fmt::Debug for TimerNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerNode")
            .field("expiry", &self.expiry)
            .field("canceled", &self.canceled.load(Ordering::Relaxed))
            .field("fired", &self.fired.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
