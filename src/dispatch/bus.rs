//! # Event bus contract.
//!
//! [`EventBus`] is the single surface callers program against. Strategies are
//! picked at construction time and swapped without touching call sites:
//!
//! ```rust
//! use topicbus::{Callback, ConcurrentBus, EventBus, Payload, SyncBus};
//!
//! fn wire(bus: &dyn EventBus) {
//!     bus.subscribe("greet", Callback::from_fn("hello", |p: &Payload| {
//!         println!("hello {p}");
//!         Ok(())
//!     }));
//!     bus.publish("greet", serde_json::json!({"name": "world"}));
//! }
//!
//! wire(&SyncBus::<Payload>::new());
//! wire(&ConcurrentBus::<Payload>::with_workers(2).unwrap());
//! ```

use crate::callbacks::Callback;

/// Default payload: arbitrary structured data.
pub type Payload = serde_json::Value;

/// Publish/subscribe contract shared by every dispatch strategy.
///
/// ### Rules
/// - Any string is a valid topic; publishing to a topic without subscribers does nothing.
/// - `unsubscribe` of an unknown topic or callback does nothing.
/// - Callback failures never reach the publisher.
pub trait EventBus<P = Payload>: Send + Sync {
    /// Registers `callback` on `topic`. Registering the same callback twice delivers twice.
    fn subscribe(&self, topic: &str, callback: Callback<P>);

    /// Removes the first registration of `callback` from `topic`.
    fn unsubscribe(&self, topic: &str, callback: &Callback<P>);

    /// Delivers `payload` to every callback subscribed to `topic`.
    fn publish(&self, topic: &str, payload: P);
}
