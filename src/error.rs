//! Error types used by the bus, its worker pool and callbacks.
//!
//! This module defines three error types:
//!
//! - [`CallbackError`]: returned by a [`Handler`](crate::Handler) to report a failed invocation.
//! - [`DispatchError`]: one delivery that failed, panicked or was rejected by the pool.
//! - [`BusError`]: errors raised by the bus lifecycle itself (startup, shutdown).
//!
//! `DispatchError` and `BusError` provide helper methods (`as_label`, `as_message`)
//! for logging/metrics. None of them is fatal to the bus: a failed delivery is
//! logged and counted, and the bus keeps serving other callbacks.

use std::time::Duration;
use thiserror::Error;

/// # Failure reported by a callback.
///
/// Handlers return this to signal that processing a payload failed. The bus
/// logs it, counts it in [`BusStats::failed`](crate::BusStats::failed) and moves on
/// to the next callback.
///
/// # Example
/// ```
/// use topicbus::CallbackError;
///
/// let err = CallbackError::new("missing field `id`");
/// assert_eq!(err.to_string(), "missing field `id`");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct CallbackError {
    message: String,
}

impl CallbackError {
    /// Creates an error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for CallbackError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for CallbackError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// # Errors produced by a single delivery.
///
/// A delivery is one callback invoked with one payload. These errors never
/// reach the publisher; both dispatchers log them and keep going.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The callback returned an error.
    #[error("callback '{callback}' failed: {error}")]
    Failed {
        /// Name of the failing callback.
        callback: String,
        /// The error message returned by the callback.
        error: String,
    },

    /// The callback panicked; the panic was caught.
    #[error("callback '{callback}' panicked: {info}")]
    Panicked {
        /// Name of the panicking callback.
        callback: String,
        /// Panic message (or `"unknown panic"` for non-string payloads).
        info: String,
    },

    /// The worker pool did not accept the delivery.
    #[error("delivery to '{callback}' rejected: queue {reason}")]
    Rejected {
        /// Name of the callback that was not scheduled.
        callback: String,
        /// `"full"` for a saturated bounded queue, `"closed"` after `close()`.
        reason: &'static str,
    },
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use topicbus::DispatchError;
    ///
    /// let err = DispatchError::Panicked { callback: "audit".into(), info: "boom".into() };
    /// assert_eq!(err.as_label(), "callback_panicked");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::Failed { .. } => "callback_failed",
            DispatchError::Panicked { .. } => "callback_panicked",
            DispatchError::Rejected { .. } => "delivery_rejected",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            DispatchError::Failed { error, .. } => format!("error: {error}"),
            DispatchError::Panicked { info, .. } => format!("panic: {info}"),
            DispatchError::Rejected { reason, .. } => format!("rejected: queue {reason}"),
        }
    }

    /// Name of the callback this delivery targeted.
    pub fn callback(&self) -> &str {
        match self {
            DispatchError::Failed { callback, .. }
            | DispatchError::Panicked { callback, .. }
            | DispatchError::Rejected { callback, .. } => callback,
        }
    }

    /// True if the callback ran and failed (as opposed to never being scheduled).
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            DispatchError::Failed { .. } | DispatchError::Panicked { .. }
        )
    }
}

/// # Errors produced by the bus lifecycle.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BusError {
    /// The worker runtime could not be started.
    #[error("failed to start worker pool: {source}")]
    Runtime {
        /// Underlying I/O error from the runtime builder.
        #[from]
        source: std::io::Error,
    },

    /// Workers did not drain the queue within the grace period; the pool was released in the background.
    #[error("shutdown grace {grace:?} exceeded; {pending} deliveries still pending")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Deliveries that were queued or running when the grace period ran out.
        pending: usize,
    },
}

impl BusError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use topicbus::BusError;
    /// use std::time::Duration;
    ///
    /// let err = BusError::GraceExceeded { grace: Duration::from_secs(5), pending: 3 };
    /// assert_eq!(err.as_label(), "bus_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BusError::Runtime { .. } => "bus_runtime",
            BusError::GraceExceeded { .. } => "bus_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            BusError::Runtime { source } => format!("runtime: {source}"),
            BusError::GraceExceeded { grace, pending } => {
                format!("grace exceeded after {grace:?}; pending deliveries={pending}")
            }
        }
    }
}
