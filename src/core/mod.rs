//! Bus core: shared state used by every dispatch strategy.
//!
//! The public API from this module is [`Registry`] (with its [`Snapshot`] view),
//! [`Config`] and [`BusStats`].
//!
//! Internal modules:
//! - [`registry`]: topic → callbacks map with copy-on-write snapshots;
//! - [`config`]: worker pool settings and their sentinel values;
//! - [`stats`]: delivery counters fed by both dispatchers.

mod config;
mod registry;
mod stats;

pub use config::Config;
pub use registry::{Registry, Snapshot};
pub use stats::BusStats;

pub(crate) use stats::Counters;
