//! Request and response queues.
//!
//! The only mutable shared state in the pipeline. The request queue is a
//! single FIFO; the response queue keeps one FIFO per transport source so
//! responses drain back to the side they came from. Each lane guards
//! itself with its own mutex and critical sections stay short (one
//! push or pop).

use std::collections::VecDeque;
use std::sync::Mutex;

use tracing::debug;

use crate::server::{HttpRequest, HttpResponse, RequestSource};

/// Thread-safe FIFO of inbound requests.
#[derive(Debug, Default)]
pub struct RequestQueue {
    inner: Mutex<VecDeque<HttpRequest>>,
}

impl RequestQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, request: HttpRequest) {
        debug!(
            request_id = %request.request_id,
            source = %request.source,
            path = %request.path,
            "Request enqueued"
        );
        self.inner.lock().unwrap().push_back(request);
    }

    #[must_use]
    pub fn dequeue(&self) -> Option<HttpRequest> {
        self.inner.lock().unwrap().pop_front()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }

    #[must_use]
    pub fn has_requests(&self) -> bool {
        !self.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }
}

/// Two-lane FIFO of outbound responses, keyed by originating transport.
#[derive(Debug, Default)]
pub struct ResponseQueue {
    local: Mutex<VecDeque<HttpResponse>>,
    cloud: Mutex<VecDeque<HttpResponse>>,
}

impl ResponseQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a response into the lane its source names.
    pub fn enqueue(&self, response: HttpResponse) {
        debug!(
            request_id = %response.request_id,
            source = %response.source,
            status = response.status_code,
            "Response enqueued"
        );
        let lane = match response.source {
            RequestSource::LocalServer => &self.local,
            RequestSource::CloudServer => &self.cloud,
        };
        lane.lock().unwrap().push_back(response);
    }

    #[must_use]
    pub fn dequeue_local(&self) -> Option<HttpResponse> {
        self.local.lock().unwrap().pop_front()
    }

    #[must_use]
    pub fn dequeue_cloud(&self) -> Option<HttpResponse> {
        self.cloud.lock().unwrap().pop_front()
    }

    /// True iff both lanes are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.local.lock().unwrap().is_empty() && self.cloud.lock().unwrap().is_empty()
    }

    #[must_use]
    pub fn has_responses(&self) -> bool {
        !self.is_empty()
    }

    #[must_use]
    pub fn local_len(&self) -> usize {
        self.local.lock().unwrap().len()
    }

    #[must_use]
    pub fn cloud_len(&self) -> usize {
        self.cloud.lock().unwrap().len()
    }
}
