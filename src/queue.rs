//! Lock-free MPSC intake: the only channel through which producer threads
//! may influence bucket membership.
//!
//! This is a Treiber stack of small boxed envelopes, each wrapping one
//! [`Event`]. Producers push with a CAS retry loop; the worker drains by
//! atomically swapping the head out for an empty chain and walking it. The
//! swapped-out chain is consumed LIFO — the most recently pushed event is
//! seen first — which is fine: see `DESIGN.md` for why reordering a
//! Register/Cancel pair for the same node is still handled correctly.
//!
//! A null head doubles as the `Tail` sentinel from the distilled design;
//! there is no separate sentinel allocation (see the substitution the
//! original design explicitly allows).

use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};
use std::sync::Arc;

use crate::node::TimerNode;

/// An event produced by a call to `schedule` or `Cancellable::cancel`.
pub(crate) enum Event {
    Register(Arc<TimerNode>),
    Cancel(Arc<TimerNode>),
}

struct Envelope {
    event: Event,
    next: *mut Envelope,
}

/// The MPSC intake queue.
pub(crate) struct EventQueue {
    head: AtomicPtr<Envelope>,
}

// Safety: `Envelope` only ever holds an `Event`, which is `Send` as long as
// `TimerNode` is `Send + Sync` (it is: its only non-atomic field is guarded
// by a `parking_lot::Mutex`). The queue itself is shared by reference across
// producer threads and the worker, so it must also be `Sync`.
unsafe impl Send for EventQueue {}
unsafe impl Sync for EventQueue {}

impl EventQueue {
    pub(crate) fn new() -> Self {
        Self {
            head: AtomicPtr::new(ptr::null_mut()),
        }
    }

    /// Push an event onto the intake. Wait-free per attempt, lock-free
    /// overall: only ever retries because another producer beat us to the
    /// CAS, never because anyone is holding a lock.
    pub(crate) fn push(&self, event: Event) {
        let envelope = Box::into_raw(Box::new(Envelope {
            event,
            next: ptr::null_mut(),
        }));

        let mut head = self.head.load(Ordering::Relaxed);
        loop {
            // Safety: `envelope` was just allocated by us and is not yet
            // visible to any other thread.
            unsafe {
                (*envelope).next = head;
            }
            match self.head.compare_exchange_weak(
                head,
                envelope,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => head = actual,
            }
        }
    }

    /// Atomically swap the intake head with the empty chain, returning an
    /// iterator over everything that had accumulated since the last drain.
    /// Only ever called from the worker thread.
    pub(crate) fn drain(&self) -> Drain {
        let head = self.head.swap(ptr::null_mut(), Ordering::AcqRel);
        Drain { current: head }
    }
}

impl Drop for EventQueue {
    fn drop(&mut self) {
        // Reclaim any events that were pushed but never drained (e.g. after
        // shutdown, per the best-effort contract in the distilled design).
        for _ in self.drain() {}
    }
}

pub(crate) struct Drain {
    current: *mut Envelope,
}

impl Iterator for Drain {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        if self.current.is_null() {
            return None;
        }
        // Safety: `current` was produced either by `EventQueue::drain`'s
        // swap (transferring ownership of the whole chain to this `Drain`)
        // or by following a previous envelope's `next`, which was written
        // once at push time and never mutated again.
        let envelope = unsafe { Box::from_raw(self.current) };
        self.current = envelope.next;
        Some(envelope.event)
    }
}
