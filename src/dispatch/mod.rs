//! # Dispatchers: the two delivery strategies behind one trait.
//!
//! ## Contents
//! - [`EventBus`] the subscribe / unsubscribe / publish contract
//! - [`SyncBus`] delivers on the publisher's thread, in subscription order
//! - [`ConcurrentBus`] hands each delivery to a bounded worker pool and returns
//!
//! ## Quick comparison
//! ```text
//!                 SyncBus                         ConcurrentBus
//! publish()       returns after all callbacks     returns after enqueueing
//! order           subscription order              none across callbacks
//! concurrency     none                            <= Config::workers callbacks
//! failures        logged + counted, continue      logged + counted, worker survives
//! ```
//!
//! Both strategies take a [`Snapshot`](crate::Snapshot) of the topic before
//! delivering, so registry changes made during a publish affect only later publishes.

mod bus;
mod concurrent_bus;
mod pool;
mod sync_bus;

pub use bus::{EventBus, Payload};
pub use concurrent_bus::ConcurrentBus;
pub use sync_bus::SyncBus;

use tracing::warn;

use crate::core::Counters;
use crate::error::DispatchError;

/// Logs a failed delivery and updates the counters.
pub(crate) fn report(topic: &str, outcome: Result<(), DispatchError>, counters: &Counters) {
    if let Err(err) = &outcome {
        warn!(
            topic,
            callback = err.callback(),
            label = err.as_label(),
            error = %err.as_message(),
            "delivery failed"
        );
    }
    counters.record(&outcome);
}
