//! The wheel worker: owns the spoke array, drains the event intake, and
//! advances the wheel by wall-clock delta.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::bucket::Bucket;
use crate::config::WheelConfig;
use crate::fault::FaultHook;
use crate::queue::{Event, EventQueue};

/// State shared between the public handle, producer threads, and the
/// worker. Buckets are deliberately *not* here: they are only ever touched
/// by the worker thread, so they live purely inside [`Worker`].
pub(crate) struct Shared {
    pub(crate) queue: EventQueue,
    pub(crate) alive: AtomicBool,
    pub(crate) start: Instant,
    pub(crate) wheel_size: usize,
    pub(crate) tick_duration: Duration,
    pub(crate) fault_hook: Arc<dyn FaultHook>,
}

impl Shared {
    /// Spoke index a given absolute expiry maps to.
    pub(crate) fn bucket_index(&self, expiry: Instant) -> usize {
        let ticks = ticks_since(self.start, expiry, self.tick_duration);
        (ticks % self.wheel_size as u64) as usize
    }
}

fn ticks_since(start: Instant, instant: Instant, tick_duration: Duration) -> u64 {
    let elapsed = instant.saturating_duration_since(start);
    (elapsed.as_nanos() / tick_duration.as_nanos().max(1)) as u64
}

/// Spawn the worker thread for a freshly constructed wheel. The returned
/// `JoinHandle` is intentionally dropped by the caller: the worker is a
/// background thread and must not prevent process exit.
pub(crate) fn spawn(shared: Arc<Shared>, config: &WheelConfig) -> thread::JoinHandle<()> {
    let worker = Worker {
        shared,
        buckets: (0..config.wheel_size).map(|_| Bucket::new()).collect(),
    };

    thread::Builder::new()
        .name(config.thread_name())
        .spawn(move || worker.run())
        .expect("failed to spawn timer wheel worker thread")
}

struct Worker {
    shared: Arc<Shared>,
    buckets: Vec<Bucket>,
}

impl Worker {
    fn run(mut self) {
        let mut last_tick = ticks_since(
            self.shared.start,
            Instant::now(),
            self.shared.tick_duration,
        );

        loop {
            self.drain_events();

            let now = Instant::now();
            let now_tick = ticks_since(self.shared.start, now, self.shared.tick_duration);
            // Saturating: a backwards-moving clock (impossible with
            // `Instant`, but defended against anyway) must never wrap this
            // into a huge catch-up loop. Clamped to `wheel_size` so a long
            // pause (GC, OS sleep, suspended VM) triggers at most one full
            // revolution of pruning, not one iteration per missed tick.
            let ticks = now_tick
                .saturating_sub(last_tick)
                .min(self.buckets.len() as u64);

            for i in 0..ticks {
                let idx = ((last_tick + i) % self.buckets.len() as u64) as usize;
                self.buckets[idx].prune(now, self.shared.fault_hook.as_ref());
            }
            last_tick = now_tick;

            if !self.shared.alive.load(Ordering::Acquire) {
                break;
            }

            let elapsed = now.elapsed();
            if elapsed < self.shared.tick_duration {
                thread::sleep(self.shared.tick_duration - elapsed);
            }
        }

        tracing::debug!("timer wheel worker shutting down");
        // `self.buckets` (and with it, every still-linked node's Arc share)
        // drops here, matching the distilled design's "release the bucket
        // array and exit".
    }

    fn drain_events(&mut self) {
        for event in self.shared.queue.drain() {
            match event {
                Event::Register(node) => {
                    if node.is_canceled() {
                        tracing::trace!("dropping canceled node before it was ever linked");
                        continue;
                    }
                    let idx = self.shared.bucket_index(node.expiry());
                    tracing::trace!(bucket = idx, expiry = ?node.expiry(), "registered timer node");
                    self.buckets[idx].add(node);
                }
                Event::Cancel(node) => {
                    node.mark_canceled();
                    let idx = self.shared.bucket_index(node.expiry());
                    self.buckets[idx].remove(&node);
                }
            }
        }
    }
}
