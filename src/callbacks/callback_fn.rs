//! # Function-backed callback (`CallbackFn`)
//!
//! [`CallbackFn`] wraps a closure `F: Fn(&P) -> Result<(), CallbackError>`.
//! The closure is shared, not cloned, between deliveries: keep mutable state
//! behind `Arc<Mutex<..>>` or atomics inside the closure.
//!
//! ## Example
//! ```rust
//! use topicbus::{Callback, CallbackError, Payload};
//!
//! let cb: Callback<Payload> = Callback::from_fn("printer", |p: &Payload| {
//!     println!("got {p}");
//!     Ok::<_, CallbackError>(())
//! });
//!
//! assert_eq!(cb.name(), "printer");
//! ```

use std::borrow::Cow;

use crate::callbacks::handler::Handler;
use crate::error::CallbackError;

/// Function-backed handler implementation.
pub struct CallbackFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> CallbackFn<F> {
    /// Creates a new function-backed handler.
    ///
    /// Prefer [`Callback::from_fn`](crate::Callback::from_fn) when you immediately need a [`Callback`](crate::Callback).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> std::fmt::Debug for CallbackFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackFn").field("name", &self.name).finish()
    }
}

impl<P, F> Handler<P> for CallbackFn<F>
where
    F: Fn(&P) -> Result<(), CallbackError> + Send + Sync + 'static, // Fn, not FnMut
{
    fn handle(&self, payload: &P) -> Result<(), CallbackError> {
        (self.f)(payload)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
