//! # Shared callback handle.
//!
//! [`Callback`] is what the registry stores and what `unsubscribe` matches on.
//! Two callbacks are equal when they are clones of the same handle; two handles
//! built separately are different subscriptions even if they wrap the same code.
//!
//! ## Example
//! ```rust
//! use topicbus::{Callback, Payload};
//!
//! let a: Callback<Payload> = Callback::from_fn("a", |_| Ok(()));
//! let same = a.clone();
//! let other: Callback<Payload> = Callback::from_fn("a", |_| Ok(()));
//!
//! assert_eq!(a, same);
//! assert_ne!(a, other);
//! ```

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::callbacks::callback_fn::CallbackFn;
use crate::callbacks::handler::Handler;
use crate::error::{CallbackError, DispatchError};

/// Shared, cloneable handle to a subscribed [`Handler`].
pub struct Callback<P> {
    handler: Arc<dyn Handler<P>>,
}

impl<P: 'static> Callback<P> {
    /// Wraps a handler into a new callback handle.
    pub fn new(handler: impl Handler<P> + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Wraps an already shared handler.
    ///
    /// Callbacks built from clones of the same `Arc` are equal.
    pub fn from_arc(handler: Arc<dyn Handler<P>>) -> Self {
        Self { handler }
    }

    /// Creates a callback from a closure.
    pub fn from_fn<F>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(&P) -> Result<(), CallbackError> + Send + Sync + 'static,
    {
        Self::new(CallbackFn::new(name, f))
    }
}

impl<P> Callback<P> {
    /// Returns the handler name.
    pub fn name(&self) -> &str {
        self.handler.name()
    }

    /// Invokes the handler once, isolating errors and panics.
    ///
    /// The panic is caught with `AssertUnwindSafe`: a handler that panics while
    /// holding a lock on shared state may leave that state poisoned or inconsistent.
    pub fn invoke(&self, payload: &P) -> Result<(), DispatchError> {
        match panic::catch_unwind(AssertUnwindSafe(|| self.handler.handle(payload))) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(DispatchError::Failed {
                callback: self.name().to_string(),
                error: err.to_string(),
            }),
            Err(panic_err) => Err(DispatchError::Panicked {
                callback: self.name().to_string(),
                info: panic_message(&*panic_err),
            }),
        }
    }
}

fn panic_message(any: &(dyn Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl<P> Clone for Callback<P> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<P> PartialEq for Callback<P> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.handler, &other.handler)
    }
}

impl<P> Eq for Callback<P> {}

impl<P> fmt::Debug for Callback<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Callback").field(&self.name()).finish()
    }
}
