//! # Example: worker_pool
//!
//! Drives a [`ConcurrentBus`] with CPU-bound subscribers, a bounded queue and a
//! misbehaving callback, then drains it with a graceful shutdown.
//!
//! ## Flow
//! ```text
//! publish × EVENTS ──► [bounded queue] ──► WORKERS workers ──► subscribers
//!                           └─► full → rejected (logged, counted)
//! shutdown() ──► close ──► drain ──► join (bounded by grace)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example worker_pool
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use topicbus::{Callback, ConcurrentBus, Config, EventBus};
use tracing_subscriber::{EnvFilter, fmt};

const EVENTS: u64 = 2_000;
const SUBSCRIBERS: usize = 8;
const WORKERS: usize = 2;

fn busy_work(seed: u64) -> u64 {
    (0..1_000u64).map(|i| (i ^ seed).wrapping_mul(i)).sum()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
    let _ = fmt().with_env_filter(filter).try_init();

    let bus = ConcurrentBus::<u64>::new(Config {
        workers: WORKERS,
        queue_capacity: 4_096,
        grace: Duration::from_secs(30),
        ..Config::default()
    })?;

    let checksum = Arc::new(AtomicU64::new(0));
    for _ in 0..SUBSCRIBERS {
        let checksum = Arc::clone(&checksum);
        bus.subscribe(
            "tick",
            Callback::from_fn("cpu", move |seed: &u64| {
                checksum.fetch_add(busy_work(*seed) & 0xff, Ordering::Relaxed);
                Ok(())
            }),
        );
    }
    bus.subscribe(
        "tick",
        Callback::from_fn("flaky", |seed: &u64| {
            if seed % 500 == 0 {
                panic!("flaky subscriber tripped on {seed}");
            }
            Ok(())
        }),
    );

    let started = Instant::now();
    for seed in 0..EVENTS {
        bus.publish("tick", seed);
    }
    let enqueue_time = started.elapsed();
    let stats_before = bus.stats();

    bus.shutdown()?;
    let total = started.elapsed();

    println!("enqueued {EVENTS} events in {enqueue_time:?}, drained in {total:?}");
    println!("stats when publishing finished: {stats_before:?}");
    println!("checksum: {}", checksum.load(Ordering::Relaxed));
    Ok(())
}
