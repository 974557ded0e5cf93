//! # Dispatch Configuration
//!
//! Sizing knobs for the inbound queue and worker pool. Defaults are sane
//! for a single node; the runtime overrides them from its own configuration.

/// Configuration for the message dispatcher.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Capacity of the bounded inbound queue. A full queue blocks producers
    /// rather than dropping messages.
    pub queue_capacity: usize,
    /// Maximum number of worker jobs processing messages concurrently.
    pub worker_count: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 4096,
            worker_count: num_cpus::get().max(1),
        }
    }
}

impl DispatchConfig {
    /// Clamp degenerate values; a zero-capacity queue or empty worker pool
    /// would deadlock the intake loop.
    pub fn sanitized(mut self) -> Self {
        self.queue_capacity = self.queue_capacity.max(1);
        self.worker_count = self.worker_count.max(1);
        self
    }
}
