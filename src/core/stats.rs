//! # Delivery counters.
//!
//! Side channel for outcomes the publisher never sees: failures inside
//! callbacks and deliveries the pool refused.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::DispatchError;

/// Point-in-time copy of a bus's delivery counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BusStats {
    /// `publish` calls, including those to topics without subscribers.
    pub published: u64,
    /// Callback invocations that returned `Ok`.
    pub delivered: u64,
    /// Callback invocations that returned an error or panicked.
    pub failed: u64,
    /// Deliveries the worker pool refused (queue full or closed).
    pub rejected: u64,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    published: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
    rejected: AtomicU64,
}

impl Counters {
    pub(crate) fn record_publish(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record(&self, outcome: &Result<(), DispatchError>) {
        let counter = match outcome {
            Ok(()) => &self.delivered,
            Err(DispatchError::Rejected { .. }) => &self.rejected,
            Err(_) => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> BusStats {
        BusStats {
            published: self.published.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}
