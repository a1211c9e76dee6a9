//! A hashed timing wheel for low-resolution, high-volume timeout scheduling.
//!
//! Built for workloads that register and cancel far more timers than
//! actually fire — I/O deadlines, keep-alives, request timeouts — where
//! millisecond-range accuracy is enough and per-timer allocation has to
//! stay cheap. Registration and cancellation are lock-free and safe from
//! any thread; a single dedicated worker thread owns all bucket mutation
//! and fires expired callbacks onto a caller-supplied [`Executor`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::sync::Arc;
//! use std::time::Duration;
//! use timer_wheel::TimerWheel;
//!
//! let wheel = TimerWheel::new().unwrap();
//! let fired = Arc::new(AtomicBool::new(false));
//! let fired2 = Arc::clone(&fired);
//!
//! let timeout = wheel
//!     .schedule_direct(move || fired2.store(true, Ordering::SeqCst), Duration::from_millis(50))
//!     .unwrap();
//!
//! // Cancel before it fires, if you change your mind:
//! timeout.cancel();
//! ```
//!
//! # What this crate is not
//!
//! It is not a high-resolution timer (sub-millisecond accuracy is out of
//! scope), it does not guarantee ordering between timers expiring in the
//! same tick, and it does not itself run your callbacks — that's the
//! [`Executor`] you (or [`PoolExecutor`]) provide.

pub mod bucket;
pub mod config;
pub mod error;
pub mod executor;
pub mod fault;
pub mod handle;
pub mod node;
pub mod pool;
pub mod queue;
pub mod wheel;

pub use config::WheelConfig;
pub use error::{ConfigError, ExecutorError, ScheduleError};
pub use executor::{DirectExecutor, Executor};
pub use fault::{FaultHook, TracingFaultHook};
pub use handle::{Cancellable, TimerWheel};
pub use pool::PoolExecutor;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_scenario_single_timer_fires_within_window() {
        let wheel = TimerWheel::with_config(
            WheelConfig::new()
                .with_wheel_size(4)
                .with_tick_duration(Duration::from_millis(50)),
        )
        .unwrap();

        let fired_at = Arc::new(parking_lot::Mutex::new(None));
        let fired_at2 = Arc::clone(&fired_at);
        let start = std::time::Instant::now();

        wheel
            .schedule_direct(
                move || *fired_at2.lock() = Some(start.elapsed()),
                Duration::from_millis(75),
            )
            .unwrap();

        std::thread::sleep(Duration::from_millis(200));

        let elapsed = fired_at.lock().expect("timer should have fired");
        assert!(elapsed >= Duration::from_millis(75));
        assert!(elapsed <= Duration::from_millis(125 + 100)); // + generous CI slack
    }

    #[test]
    fn test_scenario_many_timers_all_fire_once() {
        let wheel = TimerWheel::with_config(
            WheelConfig::new()
                .with_wheel_size(8)
                .with_tick_duration(Duration::from_millis(10)),
        )
        .unwrap();

        let count = Arc::new(AtomicUsize::new(0));
        for _ in 0..1000 {
            let count = Arc::clone(&count);
            wheel
                .schedule_direct(
                    move || {
                        count.fetch_add(1, Ordering::SeqCst);
                    },
                    Duration::from_millis(25),
                )
                .unwrap();
        }

        std::thread::sleep(Duration::from_millis(300));
        assert_eq!(count.load(Ordering::SeqCst), 1000);
    }

    #[test]
    fn test_scenario_pool_executor_receives_fault_on_rejection() {
        struct AlwaysRejects;
        impl Executor for AlwaysRejects {
            fn execute(
                &self,
                _task: Box<dyn FnOnce() + Send + 'static>,
            ) -> Result<(), ExecutorError> {
                Err(ExecutorError::Rejected("simulated failure".to_string()))
            }
        }

        struct CountingFaultHook(Arc<AtomicUsize>);
        impl FaultHook for CountingFaultHook {
            fn on_non_fatal(&self, _error: &ExecutorError) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let faults = Arc::new(AtomicUsize::new(0));
        let wheel = TimerWheel::with_fault_hook(
            WheelConfig::new()
                .with_wheel_size(4)
                .with_tick_duration(Duration::from_millis(10)),
            Arc::new(CountingFaultHook(Arc::clone(&faults))),
        )
        .unwrap();

        wheel
            .schedule(|| (), Arc::new(AlwaysRejects), Duration::from_millis(10))
            .unwrap();

        std::thread::sleep(Duration::from_millis(150));
        assert_eq!(faults.load(Ordering::SeqCst), 1);

        // The wheel keeps ticking after a fault: a later schedule still works.
        let ran = Arc::new(AtomicUsize::new(0));
        let ran2 = Arc::clone(&ran);
        wheel
            .schedule_direct(
                move || {
                    ran2.fetch_add(1, Ordering::SeqCst);
                },
                Duration::from_millis(10),
            )
            .unwrap();
        std::thread::sleep(Duration::from_millis(100));
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_scenario_shutdown_stops_future_fires() {
        let wheel = TimerWheel::with_config(
            WheelConfig::new()
                .with_wheel_size(8)
                .with_tick_duration(Duration::from_millis(10)),
        )
        .unwrap();

        // Delays span 0..495ms, past the 250ms shutdown point, so some
        // timers are still pending when shutdown happens.
        let count = Arc::new(AtomicUsize::new(0));
        for i in 0..100u64 {
            let count = Arc::clone(&count);
            let _ = wheel.schedule_direct(
                move || {
                    count.fetch_add(1, Ordering::SeqCst);
                },
                Duration::from_millis(i * 5),
            );
        }

        std::thread::sleep(Duration::from_millis(250));
        wheel.shutdown();
        let after_shutdown = count.load(Ordering::SeqCst);
        assert!(after_shutdown < 100);

        std::thread::sleep(Duration::from_millis(500));
        assert_eq!(count.load(Ordering::SeqCst), after_shutdown);
    }
}
