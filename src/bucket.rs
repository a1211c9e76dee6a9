//! Buckets — the spokes of the wheel.
//!
//! A bucket owns the set of nodes whose expiry maps to its slot. It is
//! touched exclusively by the worker thread (buckets live inside the worker
//! and are never shared with producers), so no synchronization is needed
//! here at all beyond the atomics already on [`TimerNode`] itself.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use crate::fault::FaultHook;
use crate::node::TimerNode;

/// One spoke of the wheel.
#[derive(Default)]
pub(crate) struct Bucket {
    entries: VecDeque<Arc<TimerNode>>,
}

impl Bucket {
    pub(crate) fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Link `node` into this bucket. O(1): pushed to the front, so firing
    /// order within a bucket ends up being insertion order reversed. No
    /// ordering guarantee is exposed to callers.
    pub(crate) fn add(&mut self, node: Arc<TimerNode>) {
        self.entries.push_front(node);
    }

    /// Remove a specific node from this bucket, e.g. in response to a
    /// drained `Cancel` event. Returns whether it was found.
    pub(crate) fn remove(&mut self, target: &Arc<TimerNode>) -> bool {
        if let Some(pos) = self.entries.iter().position(|n| Arc::ptr_eq(n, target)) {
            self.entries.remove(pos);
            true
        } else {
            false
        }
    }

    /// Walk the chain once: unlink and fire anything expired, unlink
    /// anything canceled, leave the rest in place.
    ///
    /// A canceled node found here is a logical anomaly — cancels are
    /// normally folded into an explicit `remove` during event drain before
    /// `prune` ever sees the bucket — but it is handled safely regardless:
    /// the race is a cancel landing between this tick's drain and this
    /// tick's prune.
    pub(crate) fn prune(&mut self, now: Instant, fault_hook: &dyn FaultHook) {
        let mut remaining = VecDeque::with_capacity(self.entries.len());
        while let Some(node) = self.entries.pop_front() {
            if node.is_canceled() {
                tracing::warn!(
                    expiry = ?node.expiry(),
                    "pruned an already-canceled node; cancel raced ahead of its drain"
                );
                continue;
            }
            if node.expiry() <= now {
                node.fire(fault_hook);
            } else {
                remaining.push_back(node);
            }
        }
        self.entries = remaining;
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
