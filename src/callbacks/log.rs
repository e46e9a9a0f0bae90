//! # LogWriter: payload logger
//!
//! A minimal handler that logs every payload it receives through `tracing`
//! at `info` level. Use it to watch a topic during development or in demos.
//!
//! ## Example output
//! ```text
//! INFO topicbus::callbacks::log: payload received subscriber="orders" payload=Object {"id": Number(1)}
//! ```

use std::fmt::Debug;

use tracing::info;

use crate::callbacks::handler::Handler;
use crate::error::CallbackError;

/// Payload-logging handler.
#[derive(Debug, Clone)]
pub struct LogWriter {
    label: String,
}

impl LogWriter {
    /// Construct a new [`LogWriter`] tagging its lines with `label`.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl Default for LogWriter {
    fn default() -> Self {
        Self::new("LogWriter")
    }
}

impl<P: Debug> Handler<P> for LogWriter {
    fn handle(&self, payload: &P) -> Result<(), CallbackError> {
        info!(subscriber = %self.label, payload = ?payload, "payload received");
        Ok(())
    }

    fn name(&self) -> &str {
        &self.label
    }
}
