//! Queue processors: dispatch on the request side, delivery on the
//! response side.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::dispatcher::Dispatcher;
use crate::queue::{RequestQueue, ResponseQueue};

use super::response::HttpResponse;
use super::transport::Transport;

/// Drains the request queue one request at a time: dequeue, dispatch,
/// enqueue the response into its source's lane.
pub struct RequestProcessor {
    requests: Arc<RequestQueue>,
    responses: Arc<ResponseQueue>,
    dispatcher: Arc<Dispatcher>,
}

impl RequestProcessor {
    pub fn new(
        requests: Arc<RequestQueue>,
        responses: Arc<ResponseQueue>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        Self {
            requests,
            responses,
            dispatcher,
        }
    }

    /// Process at most one queued request. Returns whether any work was
    /// done.
    pub fn process_one(&self) -> bool {
        let Some(request) = self.requests.dequeue() else {
            return false;
        };
        let response = self.dispatcher.dispatch(&request);
        self.responses.enqueue(response);
        true
    }
}

/// Drains the response lanes, serializing each response and sending it
/// over the transport that owns the lane.
pub struct ResponseProcessor {
    responses: Arc<ResponseQueue>,
    local: Arc<dyn Transport>,
    cloud: Option<Arc<dyn Transport>>,
}

impl ResponseProcessor {
    pub fn new(
        responses: Arc<ResponseQueue>,
        local: Arc<dyn Transport>,
        cloud: Option<Arc<dyn Transport>>,
    ) -> Self {
        Self {
            responses,
            local,
            cloud,
        }
    }

    /// Deliver at most one response from the local lane. Returns whether
    /// any work was done.
    pub fn process_local(&self) -> bool {
        let Some(response) = self.responses.dequeue_local() else {
            return false;
        };
        self.deliver(response, Some(&self.local));
        true
    }

    /// Deliver at most one response from the cloud lane. Returns whether
    /// any work was done.
    pub fn process_cloud(&self) -> bool {
        let Some(response) = self.responses.dequeue_cloud() else {
            return false;
        };
        self.deliver(response, self.cloud.as_ref());
        true
    }

    fn deliver(&self, response: HttpResponse, transport: Option<&Arc<dyn Transport>>) {
        if response.request_id.is_empty() {
            // Nothing to correlate the send with; drop it.
            warn!(
                source = %response.source,
                status = response.status_code,
                "Response without request id discarded"
            );
            return;
        }

        let Some(transport) = transport else {
            warn!(
                source = %response.source,
                request_id = %response.request_id,
                "No transport for lane, response discarded"
            );
            return;
        };

        let wire = response.to_http_string();
        if transport.send_message(&response.request_id, &wire) {
            debug!(
                transport = %transport.id(),
                request_id = %response.request_id,
                status = response.status_code,
                "Response delivered"
            );
        } else {
            // Send failures are logged and the tick moves on; the
            // response is not re-enqueued.
            warn!(
                transport = %transport.id(),
                request_id = %response.request_id,
                source = %response.source,
                "Transport send failed"
            );
        }
    }
}
