//! Delivery configuration
//!
//! Controls the worker pool, queue bound, and redelivery behavior of the
//! trigger runtime.

use std::time::Duration;

/// Configuration for event delivery and redelivery
///
/// # Example
/// ```
/// use storyhive_triggers::DeliveryConfig;
///
/// let config = DeliveryConfig::default()
///     .with_workers(4)
///     .with_max_redeliveries(5);
/// ```
#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    /// Number of worker threads draining the event queue
    pub workers: usize,
    /// Maximum queued events before `deliver` reports `QueueFull`
    pub max_queue_depth: usize,
    /// Redelivery attempts after a failed handler run (0 = deliver once)
    pub max_redeliveries: u32,
    /// Base delay before a redelivery in milliseconds (exponential backoff)
    pub base_delay_ms: u64,
    /// Maximum delay between redeliveries in milliseconds
    pub max_delay_ms: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            max_queue_depth: 4096,
            max_redeliveries: 3,
            base_delay_ms: 10,
            max_delay_ms: 100,
        }
    }
}

impl DeliveryConfig {
    /// Create a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver each event at most once, never redelivering
    pub fn no_redelivery() -> Self {
        Self {
            max_redeliveries: 0,
            ..Default::default()
        }
    }

    /// Set the worker thread count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the queue bound
    pub fn with_max_queue_depth(mut self, depth: usize) -> Self {
        self.max_queue_depth = depth;
        self
    }

    /// Set the redelivery attempt limit
    pub fn with_max_redeliveries(mut self, max_redeliveries: u32) -> Self {
        self.max_redeliveries = max_redeliveries;
        self
    }

    /// Set the base backoff delay
    pub fn with_base_delay_ms(mut self, base_delay_ms: u64) -> Self {
        self.base_delay_ms = base_delay_ms;
        self
    }

    /// Set the backoff delay cap
    pub fn with_max_delay_ms(mut self, max_delay_ms: u64) -> Self {
        self.max_delay_ms = max_delay_ms;
        self
    }

    /// Backoff before redelivery attempt `attempt` (1-based)
    pub(crate) fn backoff(&self, attempt: u32) -> Duration {
        // Cap the shift to keep the multiplier in u64 range
        let shift = attempt.saturating_sub(1).min(63);
        let delay_ms = self
            .base_delay_ms
            .saturating_mul(1u64 << shift)
            .min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }
}
