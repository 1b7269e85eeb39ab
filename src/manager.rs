//! Request manager: the cooperative loop that drives both transports
//! through the queues and back.
//!
//! Each tick:
//!
//! 1. submit one receive task per transport to the worker pool; each task
//!    drains its transport's pending requests into the request queue
//! 2. drain the request queue through the dispatcher while progress is
//!    being made
//! 3. drain both response lanes, sending each response over the transport
//!    that owns the lane
//! 4. yield for the configured tick delay
//!
//! The receive tasks run independently per transport, so ordering across
//! transports is not preserved; ordering within one transport is, end to
//! end.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{info, warn};

use crate::dispatcher::Dispatcher;
use crate::queue::{RequestQueue, ResponseQueue};
use crate::runtime_config::RuntimeConfig;
use crate::server::{RequestProcessor, ResponseProcessor, Transport};
use crate::worker_pool::WorkerPool;

/// Orchestrates receive, dispatch, and send across both transports.
pub struct RequestManager {
    local: Arc<dyn Transport>,
    cloud: Option<Arc<dyn Transport>>,
    requests: Arc<RequestQueue>,
    responses: Arc<ResponseQueue>,
    request_processor: RequestProcessor,
    response_processor: ResponseProcessor,
    pool: WorkerPool,
    // One gate per transport: receives on the same transport must never
    // run concurrently or arrival order would be lost.
    local_gate: Arc<Mutex<()>>,
    cloud_gate: Arc<Mutex<()>>,
    tick_delay: Duration,
    running: Arc<AtomicBool>,
}

impl RequestManager {
    /// Wire a manager around a dispatcher and one or two transports.
    ///
    /// The local transport is primary; the cloud transport is optional and
    /// owns the cloud response lane.
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        local: Arc<dyn Transport>,
        cloud: Option<Arc<dyn Transport>>,
        config: &RuntimeConfig,
    ) -> Self {
        let requests = Arc::new(RequestQueue::new());
        let responses = Arc::new(ResponseQueue::new());

        let request_processor = RequestProcessor::new(
            Arc::clone(&requests),
            Arc::clone(&responses),
            dispatcher,
        );
        let response_processor = ResponseProcessor::new(
            Arc::clone(&responses),
            Arc::clone(&local),
            cloud.clone(),
        );

        // Safety: pool workers are plain task consumers; the may runtime
        // needs no setup beyond process defaults before spawning them.
        let pool = unsafe { WorkerPool::new(config) };

        Self {
            local,
            cloud,
            requests,
            responses,
            request_processor,
            response_processor,
            pool,
            local_gate: Arc::new(Mutex::new(())),
            cloud_gate: Arc::new(Mutex::new(())),
            tick_delay: config.tick,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start the primary transport and, if present, the secondary.
    ///
    /// Returns whether the primary started; a secondary failure is logged
    /// but not fatal.
    pub fn start_server(&self, port: u16) -> bool {
        let started = self.local.start(port);
        if !started {
            warn!(transport = %self.local.id(), port = port, "Primary transport failed to start");
        }
        if let Some(cloud) = &self.cloud {
            if !cloud.start(port) {
                warn!(transport = %cloud.id(), port = port, "Secondary transport failed to start");
            }
        }
        started
    }

    /// Stop both transports and the run loop. Idempotent.
    pub fn stop_server(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.local.stop();
        if let Some(cloud) = &self.cloud {
            cloud.stop();
        }
    }

    /// Submit one receive-and-enqueue task per transport. Returns whether
    /// every submission was accepted by the pool.
    pub fn retrieve_requests(&self) -> bool {
        let mut submitted =
            self.submit_receive(Arc::clone(&self.local), Arc::clone(&self.local_gate));
        if let Some(cloud) = &self.cloud {
            submitted &= self.submit_receive(Arc::clone(cloud), Arc::clone(&self.cloud_gate));
        }
        submitted
    }

    fn submit_receive(&self, transport: Arc<dyn Transport>, gate: Arc<Mutex<()>>) -> bool {
        let requests = Arc::clone(&self.requests);
        self.pool.submit(move || {
            // A previous tick's receive may still be draining this
            // transport; let it finish rather than racing it.
            let Ok(_guard) = gate.try_lock() else {
                return;
            };
            while let Some(request) = transport.receive_message() {
                requests.enqueue(request);
            }
        })
    }

    /// Drain the request queue while the processor reports progress.
    /// Returns whether anything was processed.
    pub fn process_requests(&self) -> bool {
        let mut processed_any = false;
        while self.requests.has_requests() {
            if self.request_processor.process_one() {
                processed_any = true;
            } else {
                break;
            }
        }
        processed_any
    }

    /// Drain both response lanes. Returns whether anything was delivered.
    pub fn process_responses(&self) -> bool {
        let mut processed_any = false;
        while self.response_processor.process_local() {
            processed_any = true;
        }
        while self.response_processor.process_cloud() {
            processed_any = true;
        }
        processed_any
    }

    /// One full receive/dispatch/send pass, without the tick delay.
    pub fn tick(&self) {
        self.retrieve_requests();
        self.process_requests();
        self.process_responses();
    }

    /// Run the cooperative loop until [`RequestManager::stop_server`] is
    /// called. Must run inside a `may` coroutine.
    pub fn run(&self) {
        self.running.store(true, Ordering::SeqCst);
        info!(
            local = %self.local.id(),
            cloud = ?self.cloud.as_ref().map(|c| c.id()),
            tick_ms = self.tick_delay.as_millis() as u64,
            "Request manager loop started"
        );
        while self.running.load(Ordering::SeqCst) {
            self.tick();
            may::coroutine::sleep(self.tick_delay);
        }
        info!("Request manager loop stopped");
    }

    #[must_use]
    pub fn request_queue(&self) -> &Arc<RequestQueue> {
        &self.requests
    }

    #[must_use]
    pub fn response_queue(&self) -> &Arc<ResponseQueue> {
        &self.responses
    }

    #[must_use]
    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }
}
