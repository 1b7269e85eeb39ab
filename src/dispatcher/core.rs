use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use http::Method;
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::convert::PathVars;
use crate::entity::ResponseEntity;
use crate::router::{EndpointTrie, PatternError};
use crate::server::{HttpRequest, HttpResponse};
use crate::status::HttpStatus;

/// Outcome of a handler adapter. An `Err` becomes a 500 wire response.
pub type HandlerResult = anyhow::Result<HttpResponse>;

/// Handler adapter registered for one `(method, template)` pair.
pub type HandlerFn = Arc<dyn Fn(&str, &PathVars) -> HandlerResult + Send + Sync>;

/// Routes requests to handler adapters via the endpoint trie.
///
/// One template map per HTTP verb; the trie indexes every template across
/// all verbs. Register everything at startup, then share freely: dispatch
/// only reads.
#[derive(Default)]
pub struct Dispatcher {
    mappings: HashMap<Method, HashMap<String, HandlerFn>>,
    trie: EndpointTrie,
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler adapter for a method and URL template.
    ///
    /// ```rust,ignore
    /// dispatcher.register(Method::GET, "/api/user/{userId}", |_body, vars| {
    ///     let user_id: u32 = vars.get_as("userId")?;
    ///     Ok(ResponseEntity::ok(Json(lookup(user_id))).into())
    /// })?;
    /// ```
    ///
    /// # Errors
    ///
    /// [`PatternError`] when the template is malformed. Treat as fatal at
    /// startup.
    pub fn register<F>(
        &mut self,
        method: Method,
        pattern: &str,
        handler: F,
    ) -> Result<(), PatternError>
    where
        F: Fn(&str, &PathVars) -> HandlerResult + Send + Sync + 'static,
    {
        self.trie.insert(pattern)?;
        let replaced = self
            .mappings
            .entry(method.clone())
            .or_default()
            .insert(pattern.to_string(), Arc::new(handler));
        if replaced.is_some() {
            warn!(method = %method, pattern = %pattern, "Handler replaced");
        } else {
            info!(method = %method, pattern = %pattern, "Handler registered");
        }
        Ok(())
    }

    /// Number of registered `(method, template)` pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mappings.values().map(HashMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Produce the wire response for a request.
    ///
    /// Never fails: routing misses, handler errors, and handler panics all
    /// come back as error responses carrying a JSON document. The result
    /// always carries the request's id (unless the handler set its own)
    /// and source tag.
    #[must_use]
    pub fn dispatch(&self, request: &HttpRequest) -> HttpResponse {
        debug!(
            method = %request.method,
            path = %request.path,
            request_id = %request.request_id,
            "Dispatch begin"
        );

        let mut response = self.dispatch_inner(request);

        if response.request_id.is_empty() && !request.request_id.is_empty() {
            response.request_id = request.request_id.clone();
        }
        response.source = request.source;

        debug!(
            request_id = %response.request_id,
            status = response.status_code,
            "Dispatch complete"
        );
        response
    }

    fn dispatch_inner(&self, request: &HttpRequest) -> HttpResponse {
        let path = &request.path;

        let Some(matched) = self.trie.search(path) else {
            warn!(method = %request.method, path = %path, "No pattern matched");
            return Self::error_response(
                HttpStatus::NotFound,
                &format!("No pattern matched for URL: {path}"),
            );
        };

        let Some(handler) = self
            .mappings
            .get(&request.method)
            .and_then(|templates| templates.get(&matched.pattern))
        else {
            warn!(
                method = %request.method,
                pattern = %matched.pattern,
                "Pattern matched but method has no handler"
            );
            return Self::error_response(
                HttpStatus::NotFound,
                &format!("No handler for method {} on URL: {path}", request.method),
            );
        };

        let vars = PathVars::from(matched.variables);
        let outcome = catch_unwind(AssertUnwindSafe(|| handler(&request.body, &vars)));

        match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => {
                error!(
                    method = %request.method,
                    pattern = %matched.pattern,
                    request_id = %request.request_id,
                    error = %err,
                    "Handler failed"
                );
                Self::error_response(HttpStatus::InternalServerError, &err.to_string())
            }
            Err(panic) => {
                error!(
                    method = %request.method,
                    pattern = %matched.pattern,
                    request_id = %request.request_id,
                    panic = ?panic,
                    "Handler panicked"
                );
                Self::error_response(HttpStatus::InternalServerError, "Unknown exception occurred")
            }
        }
    }

    fn error_response(status: HttpStatus, message: &str) -> HttpResponse {
        let document = json!({
            "error": status.reason_phrase(),
            "message": message,
        })
        .to_string();
        ResponseEntity::new(status, document).into()
    }
}
