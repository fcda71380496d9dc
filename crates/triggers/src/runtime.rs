//! Trigger dispatch runtime
//!
//! A fixed pool of worker threads drains a bounded FIFO queue of change
//! events. Each event is matched against the registered triggers; every
//! matching handler runs on the worker that popped the event.
//!
//! ## Delivery semantics
//!
//! At-least-once, unordered:
//!
//! - A handler error (or panic) requeues the event with the same id and a
//!   bumped attempt counter, after an exponential backoff, up to the
//!   configured redelivery limit. Handlers that already succeeded for that
//!   event run again on redelivery.
//! - Multiple workers pop concurrently, so two events for the same document
//!   pair may be processed out of order or at the same time.
//! - Events that exhaust their redeliveries are dropped with an error log;
//!   nothing is surfaced to the writer that caused the event.

use crate::config::DeliveryConfig;
use crate::trigger::{Trigger, TriggerContext};
use parking_lot::{Condvar, Mutex as ParkingMutex};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use storyhive_core::{ChangeEvent, ChangeSink, Error, Result};
use storyhive_store::DocumentStore;
use tracing::{debug, error, warn};

/// Runtime metrics snapshot
#[derive(Debug, Clone, Copy)]
pub struct RuntimeStats {
    /// Events waiting in the queue
    pub queue_depth: usize,
    /// Events currently being processed by workers
    pub active_events: usize,
    /// Deliveries processed (every attempt counts)
    pub events_delivered: u64,
    /// Individual handler invocations
    pub handlers_invoked: u64,
    /// Redeliveries scheduled after handler failures
    pub redeliveries: u64,
    /// Events dropped: redeliveries exhausted or queue unavailable
    pub events_dropped: u64,
    /// Worker thread count
    pub workers: usize,
}

struct RuntimeInner {
    queue: ParkingMutex<VecDeque<ChangeEvent>>,
    work_ready: Condvar,
    drain_cond: Condvar,
    shutdown: AtomicBool,
    queue_depth: AtomicUsize,
    active_events: AtomicUsize,
    config: DeliveryConfig,
    triggers: Vec<Arc<dyn Trigger>>,
    store: DocumentStore,
    events_delivered: AtomicU64,
    handlers_invoked: AtomicU64,
    redeliveries: AtomicU64,
    events_dropped: AtomicU64,
}

impl RuntimeInner {
    fn enqueue(&self, event: ChangeEvent) -> Result<()> {
        // Reject after shutdown: workers are gone, the event would never run
        if self.shutdown.load(Ordering::Acquire) {
            return Err(Error::QueueFull);
        }
        if self.queue_depth.load(Ordering::Acquire) >= self.config.max_queue_depth {
            return Err(Error::QueueFull);
        }
        {
            let mut queue = self.queue.lock();
            queue.push_back(event);
            self.queue_depth.fetch_add(1, Ordering::Release);
        }
        self.work_ready.notify_one();
        Ok(())
    }
}

/// Worker-pool dispatcher for document change events
///
/// Implements [`ChangeSink`] so a store can publish straight into it.
pub struct TriggerRuntime {
    inner: Arc<RuntimeInner>,
    workers: ParkingMutex<Vec<JoinHandle<()>>>,
}

impl TriggerRuntime {
    /// Start a runtime: spawn workers and begin draining deliveries
    ///
    /// Workers are named `storyhive-trigger-0`, `storyhive-trigger-1`, etc.
    /// Triggers are fixed for the runtime's lifetime; an event matching
    /// several triggers invokes each in registration order.
    pub fn start(
        store: DocumentStore,
        config: DeliveryConfig,
        triggers: Vec<Arc<dyn Trigger>>,
    ) -> Arc<Self> {
        let inner = Arc::new(RuntimeInner {
            queue: ParkingMutex::new(VecDeque::new()),
            work_ready: Condvar::new(),
            drain_cond: Condvar::new(),
            shutdown: AtomicBool::new(false),
            queue_depth: AtomicUsize::new(0),
            active_events: AtomicUsize::new(0),
            config,
            triggers,
            store,
            events_delivered: AtomicU64::new(0),
            handlers_invoked: AtomicU64::new(0),
            redeliveries: AtomicU64::new(0),
            events_dropped: AtomicU64::new(0),
        });

        let mut workers = Vec::with_capacity(inner.config.workers);
        for i in 0..inner.config.workers {
            let inner_clone = Arc::clone(&inner);
            let handle = std::thread::Builder::new()
                .name(format!("storyhive-trigger-{}", i))
                .spawn(move || worker_loop(&inner_clone))
                .expect("failed to spawn trigger worker thread");
            workers.push(handle);
        }

        Arc::new(Self {
            inner,
            workers: ParkingMutex::new(workers),
        })
    }

    /// Enqueue one event for delivery
    ///
    /// This is also the redelivery entry point tests use to simulate the
    /// platform handing a handler the same event twice.
    ///
    /// # Errors
    /// `Error::QueueFull` when the queue is at capacity or the runtime has
    /// shut down.
    pub fn deliver(&self, event: ChangeEvent) -> Result<()> {
        self.inner.enqueue(event)
    }

    /// Block until the queue is empty and no handler is running
    ///
    /// Workers keep running afterwards; this is the fence tests use for
    /// "eventually" assertions.
    pub fn drain(&self) {
        let mut queue = self.inner.queue.lock();
        while self.inner.queue_depth.load(Ordering::Acquire) > 0
            || self.inner.active_events.load(Ordering::Acquire) > 0
        {
            self.inner.drain_cond.wait(&mut queue);
        }
    }

    /// Shut down: stop accepting events, drain the queue, join all workers
    pub fn shutdown(&self) {
        self.inner.shutdown.store(true, Ordering::Release);

        // Lock the queue before notifying to prevent lost-wakeup: a worker
        // between its shutdown check and condvar wait holds this lock, so
        // acquiring it guarantees the worker either is already in wait()
        // (and the notify wakes it) or has not checked shutdown yet.
        {
            let _queue = self.inner.queue.lock();
            self.inner.work_ready.notify_all();
        }

        let mut workers = self.workers.lock();
        for handle in workers.drain(..) {
            let _ = handle.join();
        }
    }

    /// Metrics snapshot
    pub fn stats(&self) -> RuntimeStats {
        RuntimeStats {
            queue_depth: self.inner.queue_depth.load(Ordering::Relaxed),
            active_events: self.inner.active_events.load(Ordering::Relaxed),
            events_delivered: self.inner.events_delivered.load(Ordering::Relaxed),
            handlers_invoked: self.inner.handlers_invoked.load(Ordering::Relaxed),
            redeliveries: self.inner.redeliveries.load(Ordering::Relaxed),
            events_dropped: self.inner.events_dropped.load(Ordering::Relaxed),
            workers: self.inner.config.workers,
        }
    }
}

impl ChangeSink for TriggerRuntime {
    fn publish(&self, event: ChangeEvent) {
        if let Err(e) = self.deliver(event) {
            warn!("change event dropped at publish: {}", e);
        }
    }
}

/// RAII guard that decrements `active_events` and notifies drain waiters.
///
/// Bookkeeping must survive handler panics; without this guard a panic would
/// leave `active_events` inflated and `drain()` would hang forever.
struct ActiveEventGuard<'a> {
    inner: &'a RuntimeInner,
}

impl<'a> Drop for ActiveEventGuard<'a> {
    fn drop(&mut self) {
        let prev_active = self.inner.active_events.fetch_sub(1, Ordering::Release);
        self.inner.events_delivered.fetch_add(1, Ordering::Relaxed);

        // Lock the queue before notifying to prevent lost-wakeup: drain()
        // holds this lock while checking its condition and calling wait().
        if prev_active == 1 && self.inner.queue_depth.load(Ordering::Acquire) == 0 {
            let _queue = self.inner.queue.lock();
            self.inner.drain_cond.notify_all();
        }
    }
}

fn worker_loop(inner: &Arc<RuntimeInner>) {
    loop {
        let event = {
            let mut queue = inner.queue.lock();
            loop {
                if let Some(event) = queue.pop_front() {
                    inner.queue_depth.fetch_sub(1, Ordering::Release);
                    inner.active_events.fetch_add(1, Ordering::Release);
                    break event;
                }
                if inner.shutdown.load(Ordering::Acquire) {
                    return;
                }
                inner.work_ready.wait(&mut queue);
            }
        };

        let _guard = ActiveEventGuard { inner };
        process_event(inner, event);
        // _guard drops here, decrementing active_events and waking drain()
    }
}

fn process_event(inner: &RuntimeInner, event: ChangeEvent) {
    let mut failed = false;

    for trigger in &inner.triggers {
        if trigger.kind() != event.kind {
            continue;
        }
        let Some(params) = trigger.pattern().matches(&event.path) else {
            continue;
        };

        inner.handlers_invoked.fetch_add(1, Ordering::Relaxed);
        let ctx = TriggerContext {
            store: &inner.store,
            event: &event,
        };

        // catch_unwind keeps a panicking handler from killing the worker;
        // a panic counts as a failed run and follows the redelivery path.
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            trigger.run(&ctx, &params)
        }));
        match outcome {
            Ok(Ok(())) => {
                debug!(
                    trigger = trigger.name(),
                    event = %event.id,
                    attempt = event.attempt,
                    "handler completed"
                );
            }
            Ok(Err(e)) => {
                warn!(
                    trigger = trigger.name(),
                    event = %event.id,
                    attempt = event.attempt,
                    "handler failed: {}",
                    e
                );
                failed = true;
            }
            Err(panic) => {
                error!(
                    trigger = trigger.name(),
                    event = %event.id,
                    "handler panicked: {:?}",
                    panic
                        .downcast_ref::<&str>()
                        .copied()
                        .unwrap_or("(non-string panic)")
                );
                failed = true;
            }
        }
    }

    if !failed {
        return;
    }

    if event.attempt >= inner.config.max_redeliveries {
        error!(
            event = %event.id,
            path = %event.path,
            attempts = event.attempt + 1,
            "redeliveries exhausted, event dropped"
        );
        inner.events_dropped.fetch_add(1, Ordering::Relaxed);
        return;
    }

    let next = event.redelivery();
    // Backoff on this worker; the rest of the pool keeps draining meanwhile
    std::thread::sleep(inner.config.backoff(next.attempt));
    match inner.enqueue(next) {
        Ok(()) => {
            inner.redeliveries.fetch_add(1, Ordering::Relaxed);
        }
        Err(_) => {
            error!(event = %event.id, "redelivery queue unavailable, event dropped");
            inner.events_dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}
