//! # Synchronous dispatch.
//!
//! [`SyncBus`] invokes every callback of a topic on the publisher's thread.
//!
//! ## What it guarantees
//! - `publish` returns only after every callback has returned or failed.
//! - Callbacks run in subscription order (as of the snapshot).
//! - A failing or panicking callback is logged and skipped; the rest still run.
//!
//! ## What it does **not** guarantee
//! - Any protection from slow callbacks: one blocking callback stalls the publisher.
//!
//! ## Diagram
//! ```text
//! publish(topic, payload)
//!     └─► registry.snapshot(topic) ─► [c1, c2, c3]
//!            ├─► c1.invoke(&payload)
//!            ├─► c2.invoke(&payload)   (Err / panic → warn!, failed += 1)
//!            └─► c3.invoke(&payload)
//! ```

use std::sync::Arc;

use tracing::debug;

use crate::callbacks::Callback;
use crate::core::{BusStats, Counters, Registry};
use crate::dispatch::{EventBus, Payload, report};

/// Bus that delivers on the caller's thread.
pub struct SyncBus<P = Payload> {
    registry: Registry<P>,
    counters: Arc<Counters>,
}

impl<P> SyncBus<P> {
    /// Creates a bus with an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Read access to the subscription registry.
    pub fn registry(&self) -> &Registry<P> {
        &self.registry
    }

    /// Delivery counters since construction.
    pub fn stats(&self) -> BusStats {
        self.counters.snapshot()
    }
}

impl<P> Default for SyncBus<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> std::fmt::Debug for SyncBus<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncBus")
            .field("registry", &self.registry)
            .field("stats", &self.stats())
            .finish()
    }
}

impl<P> EventBus<P> for SyncBus<P> {
    fn subscribe(&self, topic: &str, callback: Callback<P>) {
        self.registry.subscribe(topic, callback);
    }

    fn unsubscribe(&self, topic: &str, callback: &Callback<P>) {
        self.registry.unsubscribe(topic, callback);
    }

    fn publish(&self, topic: &str, payload: P) {
        self.counters.record_publish();
        let snapshot = self.registry.snapshot(topic);
        debug!(topic, subscribers = snapshot.len(), "publishing");

        for callback in snapshot.iter() {
            report(topic, callback.invoke(&payload), &self.counters);
        }
    }
}
