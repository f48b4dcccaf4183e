//! # Batch and signal-hub configuration.
//!
//! [`BatchConfig`] defines how a pipeline runs a batch: inter-launch spacing,
//! the concurrency ceiling, the downstream worker pool size, and channel
//! capacities. [`HubConfig`] sizes the per-kind signal history and the scan
//! poll interval.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use drover::BatchConfig;
//!
//! let mut cfg = BatchConfig::default();
//! cfg.max_in_flight = 5;
//! cfg.spacing = Duration::from_millis(50);
//!
//! assert_eq!(cfg.workers, 4);
//! ```

use std::time::Duration;

/// Configuration for one launcher/collector pipeline.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Delay inserted after starting each task before considering the next.
    pub spacing: Duration,
    /// Maximum number of tasks in flight at once (0 = unbounded).
    pub max_in_flight: usize,
    /// Number of downstream workers consuming collected items.
    pub workers: usize,
    /// Capacity of the outcome channel between launcher and collector.
    pub outcome_capacity: usize,
    /// Capacity of the downstream work channel.
    pub downstream_capacity: usize,
}

impl Default for BatchConfig {
    /// Provides a default configuration:
    /// - `spacing = 0` (no pacing)
    /// - `max_in_flight = 0` (unbounded)
    /// - `workers = 4`
    /// - `outcome_capacity = 1024`
    /// - `downstream_capacity = 1024`
    fn default() -> Self {
        Self {
            spacing: Duration::ZERO,
            max_in_flight: 0,
            workers: 4,
            outcome_capacity: 1024,
            downstream_capacity: 1024,
        }
    }
}

/// Configuration for the signal hub.
#[derive(Clone, Debug)]
pub struct HubConfig {
    /// Per-kind history ring capacity; oldest entries are evicted beyond this.
    /// Floored at 1: a ring always holds at least the newest entry.
    pub capacity: usize,
    /// Poll interval used by `scan_and_remove` while waiting for a match.
    pub scan_interval: Duration,
}

impl Default for HubConfig {
    /// Provides a default configuration:
    /// - `capacity = 100`
    /// - `scan_interval = 200ms`
    fn default() -> Self {
        Self {
            capacity: 100,
            scan_interval: Duration::from_millis(200),
        }
    }
}
