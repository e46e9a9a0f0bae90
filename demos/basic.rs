//! # Example: basic
//!
//! Subscribes a few callbacks to a topic and publishes through both dispatch
//! strategies behind the same [`EventBus`] trait object.
//!
//! Shows how to:
//! - Build callbacks from closures and from the built-in [`LogWriter`].
//! - Swap [`SyncBus`] for [`ConcurrentBus`] without touching call sites.
//! - Read [`BusStats`](topicbus::BusStats) after delivery.
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example basic
//! ```

use serde_json::json;
use topicbus::{Callback, CallbackError, ConcurrentBus, EventBus, LogWriter, Payload, SyncBus};
use tracing_subscriber::{EnvFilter, fmt};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// Wires subscribers and publishes a handful of events; knows nothing about the strategy.
fn run(bus: &dyn EventBus) {
    let greeter: Callback<Payload> = Callback::from_fn("greeter", |p: &Payload| {
        println!("hello, {}", p["name"].as_str().unwrap_or("stranger"));
        Ok(())
    });
    let validator: Callback<Payload> = Callback::from_fn("validator", |p: &Payload| {
        if p.get("name").is_none() {
            return Err(CallbackError::new("missing `name`"));
        }
        Ok(())
    });

    bus.subscribe("user.created", greeter.clone());
    bus.subscribe("user.created", validator);
    bus.subscribe("user.created", Callback::new(LogWriter::new("audit")));

    bus.publish("user.created", json!({"name": "ada"}));
    bus.publish("user.created", json!({"id": 7}));

    bus.unsubscribe("user.created", &greeter);
    bus.publish("user.created", json!({"name": "grace"}));

    // Nobody listens here: a silent no-op.
    bus.publish("user.deleted", json!({"id": 7}));
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    println!("== synchronous ==");
    let sync = SyncBus::<Payload>::new();
    run(&sync);
    println!("stats: {:?}", sync.stats());

    println!("== worker pool ==");
    let pooled = ConcurrentBus::<Payload>::with_workers(4)?;
    run(&pooled);
    let stats = pooled.stats();
    pooled.shutdown()?;
    println!("stats at publish time: {stats:?}");

    Ok(())
}
