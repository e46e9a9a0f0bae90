//! # Bus configuration.
//!
//! Provides [`Config`] centralized settings for the [`ConcurrentBus`](crate::ConcurrentBus)
//! worker pool. The synchronous bus needs no configuration.
//!
//! ## Sentinel values
//! - `queue_capacity = 0` → unbounded queue (publish never rejects for lack of space)
//! - `grace = 0s` → shutdown waits for the queue to drain without a time limit
//! - `workers = 0` → clamped to 1

use std::time::Duration;

/// Worker pool configuration.
///
/// ## Field semantics
/// - `workers`: number of worker threads, and the maximum number of callbacks running at once
/// - `queue_capacity`: pending deliveries the queue may hold (`0` = unbounded)
/// - `grace`: maximum wait for workers to drain on shutdown (`0s` = no limit)
/// - `thread_name`: name given to worker threads
///
/// ## Notes
/// All fields are public for flexibility. Prefer using helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Number of worker threads in the pool.
    pub workers: usize,

    /// Capacity of the delivery queue.
    ///
    /// - `0` = unbounded; a saturated pool grows the queue instead of pushing back
    /// - `n > 0` = at most `n` deliveries wait; further deliveries are rejected,
    ///   logged and counted in [`BusStats::rejected`](crate::BusStats::rejected)
    pub queue_capacity: usize,

    /// Maximum time to wait for queued deliveries on shutdown.
    ///
    /// If the workers are still busy when it elapses, shutdown returns
    /// `BusError::GraceExceeded` and the remaining work is abandoned.
    pub grace: Duration,

    /// Thread name for pool workers (shows up in debuggers and panic messages).
    pub thread_name: String,
}

impl Config {
    /// Returns the worker count clamped to a minimum of 1.
    #[inline]
    pub fn workers_clamped(&self) -> usize {
        self.workers.max(1)
    }

    /// Returns the queue bound as an `Option`.
    ///
    /// - `None` → unbounded
    /// - `Some(n)` → at most `n` queued deliveries
    #[inline]
    pub fn queue_limit(&self) -> Option<usize> {
        if self.queue_capacity == 0 {
            None
        } else {
            Some(self.queue_capacity)
        }
    }

    /// Returns the shutdown grace period as an `Option`.
    ///
    /// - `None` → wait until drained
    /// - `Some(d)` → give up after `d`
    #[inline]
    pub fn grace_limit(&self) -> Option<Duration> {
        if self.grace == Duration::ZERO {
            None
        } else {
            Some(self.grace)
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `workers = 10`
    /// - `queue_capacity = 0` (unbounded)
    /// - `grace = 30s`
    /// - `thread_name = "topicbus-worker"`
    fn default() -> Self {
        Self {
            workers: 10,
            queue_capacity: 0,
            grace: Duration::from_secs(30),
            thread_name: "topicbus-worker".to_string(),
        }
    }
}
