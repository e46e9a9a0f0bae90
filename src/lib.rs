//! # topicbus
//!
//! **topicbus** is an in-process publish/subscribe event bus for Rust.
//!
//! Callers subscribe callbacks to named topics and later publish a payload to a
//! topic; every callback subscribed to it receives the payload. Two dispatch
//! strategies implement the same [`EventBus`] contract and can be swapped at
//! construction time.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   subscribe(topic, cb)          unsubscribe(topic, cb)          publish(topic, payload)
//!          │                              │                               │
//!          ▼                              ▼                               ▼
//! ┌───────────────────────────────────────────────────────────────────────────────┐
//! │  EventBus<P>  (SyncBus | ConcurrentBus)                                       │
//! │  - Registry: RwLock<HashMap<topic, Arc<Vec<Callback>>>>                       │
//! │  - BusStats: published / delivered / failed / rejected                        │
//! └──────────────────────────────────────┬────────────────────────────────────────┘
//!                                        │ snapshot(topic)
//!                     ┌──────────────────┴──────────────────┐
//!                     ▼                                     ▼
//!               SyncBus::publish                    ConcurrentBus::publish
//!         (caller thread, in order)               (enqueue, return at once)
//!                     │                                     │
//!          c1.invoke ─► c2.invoke ─► c3.invoke     ┌──► [queue] ──┬──► worker 1
//!                                                  │              ├──► worker 2
//!                                                  │              └──► worker N
//!                                                  └── Config::workers bounds concurrency
//! ```
//!
//! ### Failure handling
//! ```text
//! Callback::invoke(&payload)
//!   ├─ Ok(())                 ─► delivered += 1
//!   ├─ Err(CallbackError)     ─► warn!, failed += 1, next callback
//!   └─ panic (caught)         ─► warn!, failed += 1, next callback
//! ConcurrentBus submit
//!   └─ queue full / closed    ─► warn!, rejected += 1
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                       |
//! |-------------------|---------------------------------------------------------------|------------------------------------------|
//! | **Contract**      | subscribe / unsubscribe / publish, object safe                | [`EventBus`]                             |
//! | **Dispatch**      | caller-thread or worker-pool delivery                         | [`SyncBus`], [`ConcurrentBus`]           |
//! | **Callbacks**     | trait, closure adapter, identity-based handles                | [`Handler`], [`CallbackFn`], [`Callback`]|
//! | **Registry**      | topic map with copy-on-write snapshots                        | [`Registry`], [`Snapshot`]               |
//! | **Errors**        | typed errors for callbacks, deliveries and the bus lifecycle  | [`CallbackError`], [`DispatchError`], [`BusError`] |
//! | **Configuration** | worker count, queue bound, shutdown grace                     | [`Config`]                               |
//! | **Observability** | `tracing` events and delivery counters                        | [`BusStats`], [`LogWriter`]              |
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use serde_json::json;
//! use topicbus::{Callback, EventBus, Payload, SyncBus};
//!
//! let bus = SyncBus::new();
//! let log = Arc::new(Mutex::new(Vec::new()));
//!
//! let sink = Arc::clone(&log);
//! let printer: Callback<Payload> = Callback::from_fn("printer", move |p: &Payload| {
//!     sink.lock().unwrap().push(p["msg"].to_string());
//!     Ok(())
//! });
//!
//! bus.subscribe("custom_event", printer.clone());
//! bus.publish("custom_event", json!({"msg": "hello"}));
//! bus.unsubscribe("custom_event", &printer);
//! bus.publish("custom_event", json!({"msg": "ignored"}));
//!
//! assert_eq!(*log.lock().unwrap(), ["\"hello\""]);
//! ```
mod callbacks;
mod core;
mod dispatch;
mod error;

// ---- Public re-exports ----

pub use callbacks::{Callback, CallbackFn, Handler, LogWriter};
pub use crate::core::{BusStats, Config, Registry, Snapshot};
pub use dispatch::{ConcurrentBus, EventBus, Payload, SyncBus};
pub use error::{BusError, CallbackError, DispatchError};
