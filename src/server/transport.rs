//! Transport contract and the in-memory channel transport.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use http::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Which transport a request arrived on; its response goes back the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestSource {
    LocalServer,
    CloudServer,
}

impl fmt::Display for RequestSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestSource::LocalServer => write!(f, "local"),
            RequestSource::CloudServer => write!(f, "cloud"),
        }
    }
}

/// Inbound request as produced by a transport.
///
/// The core reads the method, path, raw body, request id, and source tag;
/// everything else about the underlying protocol stays inside the
/// transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub body: String,
    pub request_id: String,
    pub source: RequestSource,
}

impl HttpRequest {
    pub fn new(
        method: Method,
        path: impl Into<String>,
        body: impl Into<String>,
        request_id: impl Into<String>,
        source: RequestSource,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            body: body.into(),
            request_id: request_id.into(),
            source,
        }
    }

    /// Build a request with a freshly minted ULID request id, the way a
    /// transport stamps inbound traffic.
    pub fn with_generated_id(
        method: Method,
        path: impl Into<String>,
        body: impl Into<String>,
        source: RequestSource,
    ) -> Self {
        Self::new(method, path, body, ulid::Ulid::new().to_string(), source)
    }
}

/// A server transport the request manager drives.
///
/// `receive_message` and `send_message` are the only calls allowed to
/// block, and implementations should keep even those brief; the manager
/// polls cooperatively.
pub trait Transport: Send + Sync {
    /// Bring the transport up. Returns whether it is accepting traffic.
    fn start(&self, port: u16) -> bool;

    /// Tear the transport down; must be idempotent.
    fn stop(&self);

    /// Next pending request, if any.
    fn receive_message(&self) -> Option<HttpRequest>;

    /// Deliver serialized response text for the given request id.
    /// Returns whether the send succeeded.
    fn send_message(&self, request_id: &str, wire_text: &str) -> bool;

    /// Stable identifier for logging.
    fn id(&self) -> String;

    /// The source tag this transport stamps on its requests.
    fn source(&self) -> RequestSource;
}

/// Queue-backed transport for tests and the demo binary.
///
/// Requests are fed in with [`ChannelTransport::push_request`]; sent
/// responses are captured and can be drained with
/// [`ChannelTransport::take_sent`].
pub struct ChannelTransport {
    id: String,
    source: RequestSource,
    running: AtomicBool,
    inbound: Mutex<VecDeque<HttpRequest>>,
    sent: Mutex<Vec<(String, String)>>,
}

impl ChannelTransport {
    pub fn new(id: impl Into<String>, source: RequestSource) -> Self {
        Self {
            id: id.into(),
            source,
            running: AtomicBool::new(false),
            inbound: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Feed an inbound request. The source tag is overwritten with this
    /// transport's own, matching what a real transport would stamp.
    pub fn push_request(&self, mut request: HttpRequest) {
        request.source = self.source;
        self.inbound.lock().unwrap().push_back(request);
    }

    /// Number of responses sent so far.
    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// Drain the captured `(request_id, wire_text)` sends.
    #[must_use]
    pub fn take_sent(&self) -> Vec<(String, String)> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Transport for ChannelTransport {
    fn start(&self, port: u16) -> bool {
        self.running.store(true, Ordering::SeqCst);
        info!(transport = %self.id, port = port, "Transport started");
        true
    }

    fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!(transport = %self.id, "Transport stopped");
        }
    }

    fn receive_message(&self) -> Option<HttpRequest> {
        if !self.is_running() {
            return None;
        }
        self.inbound.lock().unwrap().pop_front()
    }

    fn send_message(&self, request_id: &str, wire_text: &str) -> bool {
        if !self.is_running() {
            return false;
        }
        debug!(
            transport = %self.id,
            request_id = %request_id,
            bytes = wire_text.len(),
            "Response sent"
        );
        self.sent
            .lock()
            .unwrap()
            .push((request_id.to_string(), wire_text.to_string()));
        true
    }

    fn id(&self) -> String {
        self.id.clone()
    }

    fn source(&self) -> RequestSource {
        self.source
    }
}
