//! A small work-stealing thread pool, provided as a convenience
//! [`Executor`] for callers who don't want to bring their own.
//!
//! Adapted from the host project's general-purpose `ThreadPool`: the
//! queueing and stealing structure (a global injector plus one
//! `crossbeam_deque::Worker` per pool thread) is unchanged, but the result-
//! tracking machinery (`PooledJoinHandle`, `TaskId`) is gone — an `Executor`
//! is fire-and-forget, so there is nothing to join.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle as StdJoinHandle};

use crossbeam_deque::{Injector, Stealer, Worker};
use parking_lot::{Condvar, Mutex};

use crate::error::ExecutorError;
use crate::executor::Executor;

type BoxedTask = Box<dyn FnOnce() + Send + 'static>;

struct PoolInner {
    global_queue: Injector<BoxedTask>,
    stealers: Vec<Stealer<BoxedTask>>,
    shutdown: AtomicBool,
    task_available: Condvar,
    task_mutex: Mutex<()>,
    num_workers: usize,
    queued_tasks: AtomicUsize,
}

impl PoolInner {
    fn find_task(&self, local: &Worker<BoxedTask>, worker_id: usize) -> Option<BoxedTask> {
        if let Some(task) = local.pop() {
            return Some(task);
        }

        loop {
            match self.global_queue.steal() {
                crossbeam_deque::Steal::Success(task) => return Some(task),
                crossbeam_deque::Steal::Empty => break,
                crossbeam_deque::Steal::Retry => continue,
            }
        }

        for i in 0..self.stealers.len() {
            let idx = (worker_id + i + 1) % self.stealers.len();
            if idx == worker_id {
                continue;
            }
            loop {
                match self.stealers[idx].steal() {
                    crossbeam_deque::Steal::Success(task) => return Some(task),
                    crossbeam_deque::Steal::Empty => break,
                    crossbeam_deque::Steal::Retry => continue,
                }
            }
        }

        None
    }
}

/// A work-stealing thread pool that implements [`Executor`].
///
/// Tasks submitted via `execute` are pushed to a global injector queue and
/// picked up by whichever worker thread is free, stealing from siblings
/// when its own queue runs dry. Dropping the pool signals shutdown and
/// blocks until every worker thread has drained its queue and exited.
pub struct PoolExecutor {
    inner: Arc<PoolInner>,
    workers: Mutex<Vec<StdJoinHandle<()>>>,
}

impl PoolExecutor {
    /// Create a pool sized to the available parallelism.
    pub fn new() -> Self {
        let num_workers = thread::available_parallelism().map(|n| n.get()).unwrap_or(4);
        Self::with_workers(num_workers)
    }

    /// Create a pool with a specific number of worker threads.
    pub fn with_workers(num_workers: usize) -> Self {
        assert!(num_workers > 0, "pool executor must have at least 1 worker");

        let local_queues: Vec<Worker<BoxedTask>> =
            (0..num_workers).map(|_| Worker::new_fifo()).collect();
        let stealers: Vec<Stealer<BoxedTask>> =
            local_queues.iter().map(|w| w.stealer()).collect();

        let inner = Arc::new(PoolInner {
            global_queue: Injector::new(),
            stealers,
            shutdown: AtomicBool::new(false),
            task_available: Condvar::new(),
            task_mutex: Mutex::new(()),
            num_workers,
            queued_tasks: AtomicUsize::new(0),
        });

        let mut workers = Vec::with_capacity(num_workers);
        for (worker_id, local_queue) in local_queues.into_iter().enumerate() {
            let inner = Arc::clone(&inner);
            let handle = thread::Builder::new()
                .name(format!("timer-wheel-pool-{worker_id}"))
                .spawn(move || worker_loop(&inner, &local_queue, worker_id))
                .expect("failed to spawn pool executor worker thread");
            workers.push(handle);
        }

        Self {
            inner,
            workers: Mutex::new(workers),
        }
    }

    /// Number of worker threads in the pool.
    pub fn num_workers(&self) -> usize {
        self.inner.num_workers
    }

    /// Number of tasks submitted but not yet picked up by a worker.
    pub fn queued_tasks(&self) -> usize {
        self.inner.queued_tasks.load(Ordering::Relaxed)
    }
}

impl Default for PoolExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for PoolExecutor {
    fn execute(&self, task: Box<dyn FnOnce() + Send + 'static>) -> Result<(), ExecutorError> {
        if self.inner.shutdown.load(Ordering::Acquire) {
            return Err(ExecutorError::Rejected(
                "pool executor has been shut down".to_string(),
            ));
        }

        let wrapped: BoxedTask = Box::new(move || {
            if let Err(panic) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(task)) {
                let message = panic
                    .downcast_ref::<String>()
                    .cloned()
                    .or_else(|| panic.downcast_ref::<&str>().map(|s| s.to_string()))
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::error!(panic = %message, "timer callback panicked inside pool executor");
            }
        });

        self.inner.queued_tasks.fetch_add(1, Ordering::AcqRel);
        self.inner.global_queue.push(wrapped);
        self.inner.task_available.notify_one();
        Ok(())
    }
}

impl Drop for PoolExecutor {
    fn drop(&mut self) {
        self.inner.shutdown.store(true, Ordering::Release);
        self.inner.task_available.notify_all();

        let mut workers = self.workers.lock();
        for worker in workers.drain(..) {
            let _ = worker.join();
        }
    }
}

fn worker_loop(inner: &Arc<PoolInner>, local: &Worker<BoxedTask>, worker_id: usize) {
    loop {
        if let Some(task) = inner.find_task(local, worker_id) {
            task();
            inner.queued_tasks.fetch_sub(1, Ordering::AcqRel);
            continue;
        }

        if inner.shutdown.load(Ordering::Acquire) {
            break;
        }

        let mut guard = inner.task_mutex.lock();
        if inner.shutdown.load(Ordering::Acquire) {
            break;
        }
        if let Some(task) = inner.find_task(local, worker_id) {
            drop(guard);
            task();
            inner.queued_tasks.fetch_sub(1, Ordering::AcqRel);
            continue;
        }
        inner
            .task_available
            .wait_for(&mut guard, std::time::Duration::from_millis(1));
    }
}
