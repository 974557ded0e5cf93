//! # Dispatch Metrics
//!
//! Message accounting for the dispatcher. Every message that leaves the
//! queue lands in exactly one of the outcome counters, so
//! `executed + discarded_* == dequeued` holds at all times once the
//! pipeline is idle.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters maintained by the dispatcher.
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Messages accepted into the inbound queue.
    pub enqueued: AtomicU64,
    /// Messages routed to a handler (whether or not it succeeded).
    pub executed: AtomicU64,
    /// Handler invocations that returned failure.
    pub execution_failures: AtomicU64,
    /// Messages discarded for being shorter than the header.
    pub discarded_malformed: AtomicU64,
    /// Messages discarded for an out-of-range type tag.
    pub discarded_unknown_type: AtomicU64,
    /// Messages released unexecuted when the dispatcher shut down.
    pub discarded_at_shutdown: AtomicU64,
}

impl DispatchMetrics {
    /// Messages fully processed by a worker job (routed or rejected).
    pub fn processed(&self) -> u64 {
        self.executed.load(Ordering::Relaxed)
            + self.discarded_malformed.load(Ordering::Relaxed)
            + self.discarded_unknown_type.load(Ordering::Relaxed)
    }

    /// Messages accounted for in any terminal state.
    pub fn settled(&self) -> u64 {
        self.processed() + self.discarded_at_shutdown.load(Ordering::Relaxed)
    }

    /// Point-in-time copy of all counters.
    pub fn snapshot(&self) -> DispatchMetricsSnapshot {
        DispatchMetricsSnapshot {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            executed: self.executed.load(Ordering::Relaxed),
            execution_failures: self.execution_failures.load(Ordering::Relaxed),
            discarded_malformed: self.discarded_malformed.load(Ordering::Relaxed),
            discarded_unknown_type: self.discarded_unknown_type.load(Ordering::Relaxed),
            discarded_at_shutdown: self.discarded_at_shutdown.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of the dispatch counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchMetricsSnapshot {
    pub enqueued: u64,
    pub executed: u64,
    pub execution_failures: u64,
    pub discarded_malformed: u64,
    pub discarded_unknown_type: u64,
    pub discarded_at_shutdown: u64,
}
