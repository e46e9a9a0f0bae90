//! # WorkerPool: fixed set of workers draining one delivery queue.
//!
//! The pool owns a dedicated tokio runtime: one scheduler thread running
//! `workers` worker loops, and a blocking pool of at most `workers` threads
//! where callbacks actually execute. All loops pull from a single FIFO queue
//! and each runs one callback at a time, so at most `workers` callbacks run at once.
//! Callbacks may block, so they never run on the scheduler thread; the
//! scheduler also drives the timer behind the shutdown grace period.
//!
//! ## Architecture
//! ```text
//! submit(Delivery) ──► [queue] ──┬──► worker 1 ──► spawn_blocking(callback.invoke())
//!   (try_send)       (FIFO)      ├──► worker 2 ──► spawn_blocking(callback.invoke())
//!                                └──► worker N ──► spawn_blocking(callback.invoke())
//!                                                        └─► Err / panic → warn!, failed += 1
//! ```
//!
//! ## Rules
//! - **Non-blocking submit**: a bounded queue rejects when full instead of waiting.
//! - **Isolation**: `Callback::invoke` catches panics, so a worker never dies on a bad callback.
//! - **Close**: after `close()` new deliveries are rejected; queued ones still run.
//! - **Shutdown**: close, drop the queue sender, wait for workers to drain (bounded by grace).
//!   Called from inside a tokio runtime, the wait moves to a dedicated thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use tokio::runtime::{Builder, Handle, Runtime};
use tokio::sync::{Mutex, mpsc};
use tokio::task::{self, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::callbacks::Callback;
use crate::core::{Config, Counters};
use crate::dispatch::report;
use crate::error::{BusError, DispatchError};

/// One callback invocation waiting for a worker.
pub(crate) struct Delivery<P> {
    pub(crate) topic: Arc<str>,
    pub(crate) callback: Callback<P>,
    pub(crate) payload: Arc<P>,
}

impl<P> Delivery<P> {
    fn run(self, counters: &Counters) {
        let outcome = self.callback.invoke(&self.payload);
        report(&self.topic, outcome, counters);
    }

    fn reject(self, reason: &'static str) -> DispatchError {
        DispatchError::Rejected {
            callback: self.callback.name().to_string(),
            reason,
        }
    }
}

/// Sending half of the delivery queue.
enum Queue<P> {
    Bounded(mpsc::Sender<Delivery<P>>),
    Unbounded(mpsc::UnboundedSender<Delivery<P>>),
}

/// Receiving half, shared by all workers.
enum Inbox<P> {
    Bounded(mpsc::Receiver<Delivery<P>>),
    Unbounded(mpsc::UnboundedReceiver<Delivery<P>>),
}

fn channel<P>(limit: Option<usize>) -> (Queue<P>, Inbox<P>) {
    match limit {
        Some(cap) => {
            let (tx, rx) = mpsc::channel(cap);
            (Queue::Bounded(tx), Inbox::Bounded(rx))
        }
        None => {
            let (tx, rx) = mpsc::unbounded_channel();
            (Queue::Unbounded(tx), Inbox::Unbounded(rx))
        }
    }
}

impl<P> Queue<P> {
    fn push(&self, delivery: Delivery<P>) -> Result<(), DispatchError> {
        match self {
            Queue::Bounded(tx) => tx.try_send(delivery).map_err(|err| match err {
                mpsc::error::TrySendError::Full(d) => d.reject("full"),
                mpsc::error::TrySendError::Closed(d) => d.reject("closed"),
            }),
            Queue::Unbounded(tx) => tx.send(delivery).map_err(|err| err.0.reject("closed")),
        }
    }
}

impl<P> Inbox<P> {
    async fn recv(&mut self) -> Option<Delivery<P>> {
        match self {
            Inbox::Bounded(rx) => rx.recv().await,
            Inbox::Unbounded(rx) => rx.recv().await,
        }
    }
}

/// Bounded worker pool executing deliveries.
pub(crate) struct WorkerPool<P> {
    queue: Option<Queue<P>>,
    runtime: Option<Runtime>,
    workers: Vec<JoinHandle<()>>,
    closed: CancellationToken,
    pending: Arc<AtomicUsize>,
    grace: Option<Duration>,
}

impl<P: Send + Sync + 'static> WorkerPool<P> {
    /// Starts the runtime and spawns `workers` worker loops.
    pub(crate) fn new(cfg: &Config, counters: Arc<Counters>) -> Result<Self, BusError> {
        let workers = cfg.workers_clamped();
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(workers)
            .thread_name(cfg.thread_name.clone())
            .enable_time()
            .build()?;

        let (queue, inbox) = channel(cfg.queue_limit());
        let inbox = Arc::new(Mutex::new(inbox));
        let pending = Arc::new(AtomicUsize::new(0));

        let handles = (0..workers)
            .map(|_| {
                runtime.spawn(work(
                    Arc::clone(&inbox),
                    Arc::clone(&counters),
                    Arc::clone(&pending),
                ))
            })
            .collect();

        info!(
            workers,
            queue_capacity = cfg.queue_capacity,
            "worker pool started"
        );

        Ok(Self {
            queue: Some(queue),
            runtime: Some(runtime),
            workers: handles,
            closed: CancellationToken::new(),
            pending,
            grace: cfg.grace_limit(),
        })
    }

    /// Enqueues a delivery without blocking.
    pub(crate) fn submit(&self, delivery: Delivery<P>) -> Result<(), DispatchError> {
        let queue = match &self.queue {
            Some(queue) if !self.closed.is_cancelled() => queue,
            _ => return Err(delivery.reject("closed")),
        };

        self.pending.fetch_add(1, Ordering::AcqRel);
        queue.push(delivery).inspect_err(|_| {
            self.pending.fetch_sub(1, Ordering::AcqRel);
        })
    }
}

impl<P> WorkerPool<P> {
    /// Deliveries queued or running.
    pub(crate) fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Stops accepting deliveries; queued ones still run.
    pub(crate) fn close(&self) {
        if !self.closed.is_cancelled() {
            self.closed.cancel();
            debug!("worker pool closed");
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Closes the pool and waits for every queued delivery to finish.
    ///
    /// Inside an async runtime the wait happens on a dedicated thread, since
    /// the pool's runtime cannot be driven from a runtime thread. The calling
    /// thread still blocks until the drain ends or the grace period runs out.
    /// Calling it again after it returned is a no-op.
    pub(crate) fn shutdown(&mut self) -> Result<(), BusError> {
        self.close();
        drop(self.queue.take());
        let Some(runtime) = self.runtime.take() else {
            return Ok(());
        };
        let workers = std::mem::take(&mut self.workers);
        let grace = self.grace;

        let drained = if Handle::try_current().is_ok() {
            debug!("draining worker pool off the calling runtime");
            thread::scope(|s| {
                s.spawn(move || drain(runtime, workers, grace))
                    .join()
                    .unwrap_or(false)
            })
        } else {
            drain(runtime, workers, grace)
        };

        match (drained, grace) {
            (false, Some(grace)) => Err(BusError::GraceExceeded {
                grace,
                pending: self.pending(),
            }),
            _ => {
                info!("worker pool drained");
                Ok(())
            }
        }
    }
}

/// Waits for the workers to finish, bounded by `grace`.
///
/// Must run outside of any async runtime. On success the runtime is dropped
/// here; otherwise it is released in the background with its stuck callbacks.
fn drain(runtime: Runtime, workers: Vec<JoinHandle<()>>, grace: Option<Duration>) -> bool {
    let drained = runtime.block_on(async move {
        let join_all = async move {
            for handle in workers {
                let _ = handle.await;
            }
        };
        match grace {
            Some(limit) => tokio::time::timeout(limit, join_all).await.is_ok(),
            None => {
                join_all.await;
                true
            }
        }
    });

    if drained {
        drop(runtime);
    } else {
        runtime.shutdown_background();
    }
    drained
}

impl<P> Drop for WorkerPool<P> {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            error!(label = err.as_label(), error = %err, "worker pool shutdown failed");
        }
    }
}

/// Worker loop: pull, invoke, repeat until the queue is closed and empty.
async fn work<P: Send + Sync + 'static>(
    inbox: Arc<Mutex<Inbox<P>>>,
    counters: Arc<Counters>,
    pending: Arc<AtomicUsize>,
) {
    loop {
        let next = inbox.lock().await.recv().await;
        let Some(delivery) = next else {
            break;
        };
        let counters = Arc::clone(&counters);
        // Callback::invoke catches panics; a JoinError here only means the runtime is going away.
        let _ = task::spawn_blocking(move || delivery.run(&counters)).await;
        pending.fetch_sub(1, Ordering::AcqRel);
    }
}
