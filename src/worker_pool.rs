//! # Worker Pool Module
//!
//! Fixed-size pool of coroutine workers the request manager submits tasks
//! to: one receive task per transport per tick, and whatever else needs to
//! run off the manager's own loop.
//!
//! Workers share one unbounded channel, so they load-balance naturally. A
//! panicking task is isolated: the worker logs it and moves on to the next
//! task. Counters track submissions and completions for observability.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use may::sync::mpsc;
use tracing::{debug, error, info};

use crate::runtime_config::RuntimeConfig;

/// Unit of work submitted to the pool.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Submission and completion counters for a pool.
#[derive(Debug, Default)]
pub struct WorkerPoolMetrics {
    queue_depth: AtomicUsize,
    submitted: AtomicU64,
    completed: AtomicU64,
}

impl WorkerPoolMetrics {
    fn record_submit(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
        self.queue_depth.fetch_add(1, Ordering::Relaxed);
    }

    fn record_completion(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        self.queue_depth.fetch_sub(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn queue_depth(&self) -> usize {
        self.queue_depth.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }
}

/// Fixed-size pool of `may` coroutine workers consuming boxed tasks.
pub struct WorkerPool {
    sender: mpsc::Sender<Task>,
    metrics: Arc<WorkerPoolMetrics>,
    num_workers: usize,
}

impl WorkerPool {
    /// Spawn the worker coroutines.
    ///
    /// # Safety
    ///
    /// Calls `may::coroutine::Builder::spawn()`, which is unsafe in the
    /// `may` runtime. The caller must ensure the runtime is initialized
    /// before constructing a pool.
    pub unsafe fn new(config: &RuntimeConfig) -> Self {
        let (tx, rx) = mpsc::channel::<Task>();
        let rx = Arc::new(rx);
        let metrics = Arc::new(WorkerPoolMetrics::default());

        info!(
            num_workers = config.workers,
            stack_size = config.stack_size,
            "Creating worker pool"
        );

        for worker_id in 0..config.workers {
            let rx = Arc::clone(&rx);
            let metrics = Arc::clone(&metrics);

            let spawn_result = may::coroutine::Builder::new()
                .stack_size(config.stack_size)
                .spawn(move || {
                    debug!(worker_id = worker_id, "Worker coroutine started");
                    while let Ok(task) = rx.recv() {
                        if let Err(panic) = catch_unwind(AssertUnwindSafe(task)) {
                            error!(
                                worker_id = worker_id,
                                panic = ?panic,
                                "Worker task panicked"
                            );
                        }
                        metrics.record_completion();
                    }
                    debug!(worker_id = worker_id, "Worker coroutine exiting");
                });

            if let Err(err) = spawn_result {
                error!(
                    worker_id = worker_id,
                    error = %err,
                    "Failed to spawn worker coroutine"
                );
            }
        }

        Self {
            sender: tx,
            metrics,
            num_workers: config.workers,
        }
    }

    /// Hand a task to the pool. Returns `false` when the workers are gone
    /// and the channel is disconnected.
    pub fn submit<F>(&self, task: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        self.metrics.record_submit();
        if let Err(err) = self.sender.send(Box::new(task)) {
            error!(error = %err, "Worker pool channel disconnected");
            return false;
        }
        true
    }

    #[must_use]
    pub fn metrics(&self) -> &Arc<WorkerPoolMetrics> {
        &self.metrics
    }

    #[must_use]
    pub fn num_workers(&self) -> usize {
        self.num_workers
    }
}
