//! # Concurrent dispatch over a bounded worker pool.
//!
//! [`ConcurrentBus`] turns each publish into one delivery per subscribed
//! callback and hands them to a fixed-size worker pool **without awaiting**
//! their processing.
//!
//! ## What it guarantees
//! - `publish()` returns as soon as the deliveries are enqueued (fire-and-forget).
//! - Every accepted delivery runs exactly once before `shutdown()` returns
//!   (unless the grace period runs out).
//! - At most [`Config::workers`] callbacks run at the same time.
//! - Panics and errors inside callbacks are caught and logged (isolation).
//!
//! ## What it does **not** guarantee
//! - No ordering between callbacks, within one publish or across publishes.
//! - With a bounded queue, no retries: a delivery that does not fit is rejected,
//!   logged, and counted in [`BusStats::rejected`].
//!
//! ## Diagram
//! ```text
//! publish(topic, payload)
//!     ├─► registry.snapshot(topic) ─► [c1, c2, c3]
//!     ├─► Arc::new(payload)                        (shared, never copied)
//!     └─► submit(c1) submit(c2) submit(c3) ──► WorkerPool ──► workers 1..N
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use topicbus::{Callback, ConcurrentBus, Config, EventBus};
//!
//! let bus = ConcurrentBus::<u64>::new(Config { workers: 4, ..Config::default() }).unwrap();
//! let total = Arc::new(AtomicUsize::new(0));
//! let sum = Arc::clone(&total);
//! bus.subscribe("metrics", Callback::from_fn("sum", move |v: &u64| {
//!     sum.fetch_add(*v as usize, Ordering::Relaxed);
//!     Ok(())
//! }));
//!
//! for v in 1..=10 {
//!     bus.publish("metrics", v);
//! }
//! bus.shutdown().unwrap(); // drains the queue
//! assert_eq!(total.load(Ordering::Relaxed), 55);
//! ```

use std::sync::Arc;

use tracing::debug;

use crate::callbacks::Callback;
use crate::core::{BusStats, Config, Counters, Registry};
use crate::dispatch::pool::{Delivery, WorkerPool};
use crate::dispatch::{EventBus, Payload, report};
use crate::error::BusError;

/// Bus that delivers on a bounded worker pool.
pub struct ConcurrentBus<P = Payload> {
    registry: Registry<P>,
    pool: WorkerPool<P>,
    counters: Arc<Counters>,
}

impl<P: Send + Sync + 'static> ConcurrentBus<P> {
    /// Creates a bus and starts its worker pool.
    pub fn new(cfg: Config) -> Result<Self, BusError> {
        let counters = Arc::new(Counters::default());
        let pool = WorkerPool::new(&cfg, Arc::clone(&counters))?;
        Ok(Self {
            registry: Registry::new(),
            pool,
            counters,
        })
    }

    /// Creates a bus with `workers` threads and default settings otherwise.
    pub fn with_workers(workers: usize) -> Result<Self, BusError> {
        Self::new(Config {
            workers,
            ..Config::default()
        })
    }
}

impl<P> ConcurrentBus<P> {
    /// Read access to the subscription registry.
    pub fn registry(&self) -> &Registry<P> {
        &self.registry
    }

    /// Delivery counters since construction.
    pub fn stats(&self) -> BusStats {
        self.counters.snapshot()
    }

    /// Deliveries currently queued or running.
    pub fn pending(&self) -> usize {
        self.pool.pending()
    }

    /// Stops accepting new deliveries. Already queued deliveries still run.
    pub fn close(&self) {
        self.pool.close();
    }

    /// True once [`close`](Self::close) or shutdown has started.
    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    /// Graceful shutdown: reject new deliveries, drain the queue, stop the workers.
    ///
    /// Waits at most [`Config::grace`]. Blocks the calling thread, also when
    /// called from inside a tokio runtime; dropping the bus performs the same
    /// shutdown and logs any error.
    pub fn shutdown(mut self) -> Result<(), BusError> {
        self.pool.shutdown()
    }
}

impl<P> std::fmt::Debug for ConcurrentBus<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrentBus")
            .field("registry", &self.registry)
            .field("pending", &self.pending())
            .field("closed", &self.is_closed())
            .field("stats", &self.stats())
            .finish()
    }
}

impl<P: Send + Sync + 'static> EventBus<P> for ConcurrentBus<P> {
    fn subscribe(&self, topic: &str, callback: Callback<P>) {
        self.registry.subscribe(topic, callback);
    }

    fn unsubscribe(&self, topic: &str, callback: &Callback<P>) {
        self.registry.unsubscribe(topic, callback);
    }

    fn publish(&self, topic: &str, payload: P) {
        self.counters.record_publish();
        let snapshot = self.registry.snapshot(topic);
        debug!(topic, subscribers = snapshot.len(), "publishing");
        if snapshot.is_empty() {
            return;
        }

        let shared_topic: Arc<str> = Arc::from(topic);
        let payload = Arc::new(payload);
        for callback in snapshot.iter() {
            let delivery = Delivery {
                topic: Arc::clone(&shared_topic),
                callback: callback.clone(),
                payload: Arc::clone(&payload),
            };
            if let Err(err) = self.pool.submit(delivery) {
                report(topic, Err(err), &self.counters);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Mutex, mpsc};
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::error::CallbackError;

    fn counter(name: &'static str, hits: &Arc<AtomicUsize>) -> Callback<u32> {
        let hits = Arc::clone(hits);
        Callback::from_fn(name, move |_| {
            hits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    type Gate = Arc<Mutex<mpsc::Receiver<()>>>;

    fn gate() -> (mpsc::Sender<()>, Gate) {
        let (tx, rx) = mpsc::channel();
        (tx, Arc::new(Mutex::new(rx)))
    }

    fn gated(name: &'static str, gate: &Gate) -> Callback<u32> {
        let gate = Arc::clone(gate);
        Callback::from_fn(name, move |_| {
            let _ = gate.lock().unwrap().recv();
            Ok(())
        })
    }

    fn small(workers: usize, queue_capacity: usize) -> ConcurrentBus<u32> {
        ConcurrentBus::new(Config {
            workers,
            queue_capacity,
            grace: Duration::from_secs(10),
            ..Config::default()
        })
        .unwrap()
    }

    #[test]
    fn test_every_callback_runs_once_per_publish() {
        let bus = small(4, 0);
        let hits: Vec<Arc<AtomicUsize>> = (0..5).map(|_| Arc::default()).collect();
        for h in &hits {
            bus.subscribe("t", counter("c", h));
        }

        for i in 0..100 {
            bus.publish("t", i);
        }
        let stats_handle = bus.counters.clone();
        bus.shutdown().unwrap();

        for h in &hits {
            assert_eq!(h.load(Ordering::SeqCst), 100);
        }
        let stats = stats_handle.snapshot();
        assert_eq!(stats.published, 100);
        assert_eq!(stats.delivered, 500);
        assert_eq!(stats.failed, 0);
        assert_eq!(stats.rejected, 0);
    }

    #[test]
    fn test_unknown_topic_is_noop() {
        let bus = small(1, 0);
        bus.publish("nobody-listens", 1);
        assert_eq!(bus.pending(), 0);
        let stats = bus.stats();
        assert_eq!(stats.published, 1);
        assert_eq!(stats.delivered + stats.failed + stats.rejected, 0);
        bus.shutdown().unwrap();
    }

    #[test]
    fn test_failures_are_isolated() {
        let bus = small(2, 0);
        let ok = Arc::new(AtomicUsize::new(0));
        bus.subscribe("t", counter("before", &ok));
        bus.subscribe("t", Callback::from_fn("panics", |v| panic!("bad {v}")));
        bus.subscribe(
            "t",
            Callback::from_fn("errors", |_| Err(CallbackError::new("nope"))),
        );
        bus.subscribe("t", counter("after", &ok));

        for i in 0..20 {
            bus.publish("t", i);
        }
        let counters = bus.counters.clone();
        bus.shutdown().unwrap();

        assert_eq!(ok.load(Ordering::SeqCst), 40);
        let stats = counters.snapshot();
        assert_eq!(stats.delivered, 40);
        assert_eq!(stats.failed, 40);
    }

    #[test]
    fn test_concurrency_bounded_by_workers() {
        let bus = small(2, 0);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let done = Arc::new(AtomicUsize::new(0));

        for _ in 0..8 {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            let done = Arc::clone(&done);
            bus.subscribe(
                "work",
                Callback::from_fn("sleepy", move |_| {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(20));
                    running.fetch_sub(1, Ordering::SeqCst);
                    done.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }),
            );
        }

        bus.publish("work", 0);
        bus.shutdown().unwrap();

        assert_eq!(done.load(Ordering::SeqCst), 8);
        let peak = peak.load(Ordering::SeqCst);
        assert!((1..=2).contains(&peak), "peak concurrency {peak}");
    }

    #[test]
    fn test_publish_does_not_wait_for_callbacks() {
        let bus = small(1, 0);
        let (release, g) = gate();
        bus.subscribe("t", gated("blocked", &g));

        bus.publish("t", 1);
        bus.publish("t", 2);
        assert_eq!(bus.stats().delivered, 0);
        assert_eq!(bus.pending(), 2);

        release.send(()).unwrap();
        release.send(()).unwrap();
        let counters = bus.counters.clone();
        bus.shutdown().unwrap();
        assert_eq!(counters.snapshot().delivered, 2);
    }

    #[test]
    fn test_bounded_queue_rejects_overflow() {
        let bus = small(1, 1);
        let (release, g) = gate();
        for name in ["a", "b", "c"] {
            bus.subscribe("t", gated(name, &g));
        }

        bus.publish("t", 0);
        let rejected = bus.stats().rejected;
        assert!((1..=2).contains(&rejected), "rejected {rejected}");

        for _ in 0..3 {
            release.send(()).unwrap();
        }
        let counters = bus.counters.clone();
        bus.shutdown().unwrap();

        let stats = counters.snapshot();
        assert_eq!(stats.delivered + stats.rejected, 3);
        assert_eq!(stats.rejected, rejected);
    }

    #[test]
    fn test_close_rejects_but_drains_queued() {
        let bus = small(1, 0);
        let hits = Arc::new(AtomicUsize::new(0));
        let (release, g) = gate();
        bus.subscribe("t", gated("gate", &g));
        bus.subscribe("t", counter("count", &hits));

        bus.publish("t", 1);
        bus.close();
        assert!(bus.is_closed());
        bus.publish("t", 2);
        assert_eq!(bus.stats().rejected, 2);

        release.send(()).unwrap();
        let counters = bus.counters.clone();
        bus.shutdown().unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(counters.snapshot().delivered, 2);
    }

    #[test]
    fn test_grace_exceeded() {
        let bus = ConcurrentBus::<u32>::new(Config {
            workers: 1,
            grace: Duration::from_millis(50),
            ..Config::default()
        })
        .unwrap();
        let (release, g) = gate();
        bus.subscribe("t", gated("stuck", &g));
        bus.publish("t", 0);
        bus.publish("t", 1);

        match bus.shutdown() {
            Err(BusError::GraceExceeded { grace, pending }) => {
                assert_eq!(grace, Duration::from_millis(50));
                assert!(pending >= 1);
            }
            other => panic!("unexpected: {other:?}"),
        }
        drop(release);
    }

    fn slow_counter(hits: &Arc<AtomicUsize>) -> Callback<u32> {
        let hits = Arc::clone(hits);
        Callback::from_fn("slow", move |_| {
            thread::sleep(Duration::from_millis(20));
            hits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    #[test]
    fn test_shutdown_inside_async_runtime_drains() {
        let hits = Arc::new(AtomicUsize::new(0));
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();

        let res = rt.block_on(async {
            let bus = small(1, 0);
            bus.subscribe("t", slow_counter(&hits));
            for i in 0..10 {
                bus.publish("t", i);
            }
            bus.shutdown()
        });

        assert!(res.is_ok(), "unexpected: {res:?}");
        assert_eq!(hits.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_drop_inside_async_runtime_drains() {
        let hits = Arc::new(AtomicUsize::new(0));
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .build()
            .unwrap();

        rt.block_on(async {
            let bus = ConcurrentBus::<u32>::with_workers(1).unwrap();
            bus.subscribe("t", slow_counter(&hits));
            for i in 0..10 {
                bus.publish("t", i);
            }
            drop(bus);
        });

        assert_eq!(hits.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_grace_applies_inside_async_runtime() {
        let bus = ConcurrentBus::<u32>::new(Config {
            workers: 1,
            grace: Duration::from_millis(50),
            ..Config::default()
        })
        .unwrap();
        let (release, g) = gate();
        bus.subscribe("t", gated("stuck", &g));
        bus.publish("t", 0);

        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let res = rt.block_on(async move { bus.shutdown() });
        assert!(matches!(res, Err(BusError::GraceExceeded { pending: 1, .. })));
        drop(release);
    }

    #[test]
    fn test_drop_drains_queue() {
        let hits = Arc::new(AtomicUsize::new(0));
        {
            let bus = small(2, 0);
            bus.subscribe("t", counter("c", &hits));
            for i in 0..50 {
                bus.publish("t", i);
            }
        }
        assert_eq!(hits.load(Ordering::SeqCst), 50);
    }

    #[test]
    fn test_concurrent_publish_and_mutation() {
        let bus = small(4, 0);
        let stable_hits = Arc::new(AtomicUsize::new(0));
        bus.subscribe("t", counter("stable", &stable_hits));

        thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for i in 0..100 {
                        let tmp: Callback<u32> = Callback::from_fn("tmp", |_| Ok(()));
                        bus.subscribe("t", tmp.clone());
                        bus.publish("t", i);
                        bus.unsubscribe("t", &tmp);
                    }
                });
            }
        });

        assert_eq!(bus.registry().subscriber_count("t"), 1);
        let counters = bus.counters.clone();
        bus.shutdown().unwrap();

        assert_eq!(stable_hits.load(Ordering::SeqCst), 400);
        let stats = counters.snapshot();
        assert_eq!(stats.published, 400);
        assert!(stats.delivered >= 800);
        assert_eq!(stats.failed + stats.rejected, 0);
    }

    #[test]
    fn test_usable_as_trait_object() {
        let hits = Arc::new(AtomicUsize::new(0));
        let bus: Box<dyn EventBus<u32>> = Box::new(small(2, 0));
        let cb = counter("c", &hits);
        bus.subscribe("t", cb.clone());
        bus.publish("t", 1);
        bus.unsubscribe("t", &cb);
        bus.publish("t", 2);
        drop(bus);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
