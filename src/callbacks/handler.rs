//! # Callback trait.
//!
//! Provides [`Handler`] the extension point for plugging behaviour into a topic.
//!
//! ## Rules
//! - `handle` may be called from the publisher's thread ([`SyncBus`](crate::SyncBus))
//!   or from a pool worker ([`ConcurrentBus`](crate::ConcurrentBus)).
//! - Returning `Err` or panicking only affects this delivery; other callbacks still run.
//! - Under the concurrent bus the same handler may run on several workers at once.

use crate::error::CallbackError;

/// Caller-supplied behaviour invoked on publish.
///
/// # Example
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use topicbus::{Callback, CallbackError, EventBus, Handler, SyncBus};
///
/// #[derive(Default)]
/// struct Counter(AtomicUsize);
///
/// impl Handler<u32> for Counter {
///     fn handle(&self, payload: &u32) -> Result<(), CallbackError> {
///         self.0.fetch_add(*payload as usize, Ordering::Relaxed);
///         Ok(())
///     }
///
///     fn name(&self) -> &str { "counter" }
/// }
///
/// let bus = SyncBus::<u32>::new();
/// bus.subscribe("ticks", Callback::new(Counter::default()));
/// bus.publish("ticks", 3);
/// assert_eq!(bus.stats().delivered, 1);
/// ```
pub trait Handler<P>: Send + Sync {
    /// Processes one published payload.
    fn handle(&self, payload: &P) -> Result<(), CallbackError>;

    /// Returns the callback name used in logs and errors.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
