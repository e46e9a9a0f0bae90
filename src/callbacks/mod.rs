//! # Callbacks: the units of behaviour subscribed to topics.
//!
//! ## Contents
//! - [`Handler`] the trait a callback implements (one method taking `&P`)
//! - [`Callback`] shared handle stored by the registry; equality is identity
//! - [`CallbackFn`] closure-backed handler
//! - [`LogWriter`] built-in handler that logs every payload it receives
//!
//! ## Architecture
//! ```text
//! Callback<P> ──► Arc<dyn Handler<P>>
//!     │
//!     └─► invoke(&P) ──► catch_unwind(handler.handle(&P))
//!                            ├─ Ok(())          ─► delivered
//!                            ├─ Err(CallbackErr) ─► DispatchError::Failed
//!                            └─ panic            ─► DispatchError::Panicked
//! ```
//!
//! Both dispatchers go through [`Callback::invoke`], so failure isolation is
//! identical for synchronous and pooled delivery.

mod callback;
mod callback_fn;
mod handler;
mod log;

pub use callback::Callback;
pub use callback_fn::CallbackFn;
pub use handler::Handler;
pub use log::LogWriter;
