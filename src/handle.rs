//! The public entry point: [`TimerWheel`] and the [`Cancellable`] handles it
//! hands back from `schedule`.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::WheelConfig;
use crate::error::{ConfigError, ScheduleError};
use crate::executor::{DirectExecutor, Executor};
use crate::fault::{FaultHook, TracingFaultHook};
use crate::node::TimerNode;
use crate::queue::{Event, EventQueue};
use crate::wheel::{self, Shared};

/// A hashed timing wheel that schedules one-shot callbacks with
/// millisecond-range accuracy.
///
/// Construction spawns a dedicated background worker thread. Any number of
/// producer threads may call [`schedule`](Self::schedule) and
/// [`Cancellable::cancel`] concurrently; only the worker thread ever mutates
/// bucket membership.
pub struct TimerWheel {
    shared: Arc<Shared>,
    direct_executor: Arc<DirectExecutor>,
}

impl TimerWheel {
    /// Construct a wheel with default configuration (512 spokes, 200ms
    /// ticks) and start its worker thread.
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_config(WheelConfig::default())
    }

    /// Construct a wheel with the given configuration and start its worker
    /// thread.
    pub fn with_config(config: WheelConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let shared = Arc::new(Shared {
            queue: EventQueue::new(),
            alive: std::sync::atomic::AtomicBool::new(true),
            start: Instant::now(),
            wheel_size: config.wheel_size,
            tick_duration: config.tick_duration,
            fault_hook: Arc::new(TracingFaultHook) as Arc<dyn FaultHook>,
        });

        tracing::debug!(
            wheel_size = config.wheel_size,
            tick_ms = config.tick_duration.as_millis(),
            "starting timer wheel worker"
        );
        let handle = wheel::spawn(Arc::clone(&shared), &config);
        drop(handle); // daemon-style: never joined, never prevents process exit

        Ok(Self {
            shared,
            direct_executor: Arc::new(DirectExecutor),
        })
    }

    /// Use a custom fault hook instead of the default [`TracingFaultHook`].
    ///
    /// Must be called as part of construction; there is deliberately no
    /// setter on a running wheel, since the hook is read from the worker
    /// thread without synchronization beyond the `Arc` it's wrapped in.
    pub fn with_fault_hook(config: WheelConfig, fault_hook: Arc<dyn FaultHook>) -> Result<Self, ConfigError> {
        config.validate()?;

        let shared = Arc::new(Shared {
            queue: EventQueue::new(),
            alive: std::sync::atomic::AtomicBool::new(true),
            start: Instant::now(),
            wheel_size: config.wheel_size,
            tick_duration: config.tick_duration,
            fault_hook,
        });

        let handle = wheel::spawn(Arc::clone(&shared), &config);
        drop(handle);

        Ok(Self {
            shared,
            direct_executor: Arc::new(DirectExecutor),
        })
    }

    /// Schedule `callback` to run on `executor` after `delay`.
    ///
    /// A zero delay bypasses the wheel entirely: the callback is submitted
    /// to `executor` synchronously, on the calling thread, and the returned
    /// `Cancellable` is a no-op.
    pub fn schedule<F>(
        &self,
        callback: F,
        executor: Arc<dyn Executor>,
        delay: Duration,
    ) -> Result<Cancellable, ScheduleError>
    where
        F: FnOnce() + Send + 'static,
    {
        if !self.shared.alive.load(Ordering::Acquire) {
            return Err(ScheduleError::NotRunning);
        }

        if delay.is_zero() {
            if let Err(err) = executor.execute(Box::new(callback)) {
                self.shared.fault_hook.on_non_fatal(&err);
            }
            return Ok(Cancellable::noop());
        }

        let expiry = Instant::now() + delay;
        let node = Arc::new(TimerNode::new(expiry, executor, Box::new(callback)));
        self.shared.queue.push(Event::Register(Arc::clone(&node)));

        Ok(Cancellable::linked(node, Arc::clone(&self.shared)))
    }

    /// Convenience for `schedule(callback, Arc::new(DirectExecutor), delay)`.
    pub fn schedule_direct<F>(&self, callback: F, delay: Duration) -> Result<Cancellable, ScheduleError>
    where
        F: FnOnce() + Send + 'static,
    {
        let executor = Arc::clone(&self.direct_executor) as Arc<dyn Executor>;
        self.schedule(callback, executor, delay)
    }

    /// Request shutdown. Returns immediately; the worker finishes its
    /// current tick and then exits without draining outstanding events.
    /// Timers already in flight may or may not fire — this is a best-effort
    /// stop, not a drain.
    pub fn shutdown(&self) {
        tracing::debug!("timer wheel shutdown requested");
        self.shared.alive.store(false, Ordering::Release);
    }

    /// Whether `shutdown` has not yet been called.
    pub fn is_running(&self) -> bool {
        self.shared.alive.load(Ordering::Acquire)
    }
}

impl Default for TimerWheel {
    fn default() -> Self {
        Self::new().expect("default timer wheel configuration is always valid")
    }
}

impl Drop for TimerWheel {
    fn drop(&mut self) {
        self.shutdown();
    }
}

enum CancellableInner {
    /// Bound to a real node sitting in the wheel; cancellation pushes a
    /// `Cancel` event.
    Linked {
        node: Arc<TimerNode>,
        shared: Arc<Shared>,
    },
    /// Returned for zero-delay schedules, which never touch the wheel.
    NoOp,
}

/// A capability to best-effort cancel a scheduled timer.
///
/// `cancel()` is idempotent and safe to call from any thread, including
/// after the callback has already fired (a no-op at that point). It does
/// not guarantee suppression if the callback has already been submitted to
/// its executor.
#[derive(Clone)]
pub struct Cancellable {
    inner: Arc<CancellableInner>,
}

impl Cancellable {
    pub(crate) fn linked(node: Arc<TimerNode>, shared: Arc<Shared>) -> Self {
        Self {
            inner: Arc::new(CancellableInner::Linked { node, shared }),
        }
    }

    pub(crate) fn noop() -> Self {
        Self {
            inner: Arc::new(CancellableInner::NoOp),
        }
    }

    /// Best-effort cancel. Marks the node canceled immediately (visible to
    /// `prune` right away) and enqueues a `Cancel` event so the worker
    /// unlinks it from its bucket on the next drain.
    pub fn cancel(&self) {
        if let CancellableInner::Linked { node, shared } = self.inner.as_ref() {
            node.mark_canceled();
            shared.queue.push(Event::Cancel(Arc::clone(node)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    #[test]
    fn test_zero_delay_runs_synchronously_and_returns_noop() {
        let wheel = TimerWheel::new().unwrap();
        let ran = Arc::new(AtomicUsize::new(0));
        let ran2 = Arc::clone(&ran);

        let cancellable = wheel
            .schedule_direct(move || { ran2.fetch_add(1, Ordering::SeqCst); }, Duration::ZERO)
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(ran.load(Ordering::SeqCst), 1);
        cancellable.cancel(); // no-op, must not panic
    }

    #[test]
    fn test_schedule_fires_after_delay() {
        let wheel = TimerWheel::with_config(
            WheelConfig::new()
                .with_wheel_size(8)
                .with_tick_duration(Duration::from_millis(10)),
        )
        .unwrap();

        let ran = Arc::new(AtomicUsize::new(0));
        let ran2 = Arc::clone(&ran);
        wheel
            .schedule_direct(move || { ran2.fetch_add(1, Ordering::SeqCst); }, Duration::from_millis(30))
            .unwrap();

        thread::sleep(Duration::from_millis(120));
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancel_before_drain_suppresses_callback() {
        let wheel = TimerWheel::with_config(
            WheelConfig::new()
                .with_wheel_size(4)
                .with_tick_duration(Duration::from_millis(50)),
        )
        .unwrap();

        let ran = Arc::new(AtomicUsize::new(0));
        let ran2 = Arc::clone(&ran);
        let cancellable = wheel
            .schedule_direct(move || { ran2.fetch_add(1, Ordering::SeqCst); }, Duration::from_secs(1))
            .unwrap();

        thread::sleep(Duration::from_millis(10));
        cancellable.cancel();

        thread::sleep(Duration::from_millis(200));
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_schedule_after_shutdown_fails() {
        let wheel = TimerWheel::new().unwrap();
        wheel.shutdown();
        thread::sleep(Duration::from_millis(10));

        let result = wheel.schedule_direct(|| (), Duration::from_millis(10));
        assert!(matches!(result, Err(ScheduleError::NotRunning)));
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let wheel = TimerWheel::with_config(
            WheelConfig::new()
                .with_wheel_size(4)
                .with_tick_duration(Duration::from_millis(20)),
        )
        .unwrap();
        let cancellable = wheel
            .schedule_direct(|| (), Duration::from_secs(10))
            .unwrap();

        cancellable.cancel();
        cancellable.cancel();
        cancellable.cancel();
    }
}
