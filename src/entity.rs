//! Response envelope returned by handlers.
//!
//! [`ResponseEntity`] wraps a body value with an HTTP status and headers,
//! in the manner of Spring's `ResponseEntity`. Envelopes are plain values:
//! factories build them, fluent `with_*` methods chain on them, and the
//! dispatcher converts them into wire responses when the handler returns.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use crate::body::ResponseBody;
use crate::status::HttpStatus;

/// Typed response envelope: status, headers, body.
///
/// ```rust,ignore
/// let response = ResponseEntity::created(Json(device))
///     .with_header("Location", "/api/devices/7");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEntity<T> {
    status: HttpStatus,
    headers: BTreeMap<String, String>,
    body: T,
}

impl<T> ResponseEntity<T> {
    /// Envelope with an arbitrary status. This is also the generic
    /// `status(code, body)` factory.
    pub fn new(status: HttpStatus, body: T) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body,
        }
    }

    pub fn ok(body: T) -> Self {
        Self::new(HttpStatus::Ok, body)
    }

    pub fn created(body: T) -> Self {
        Self::new(HttpStatus::Created, body)
    }

    pub fn accepted(body: T) -> Self {
        Self::new(HttpStatus::Accepted, body)
    }

    pub fn bad_request(body: T) -> Self {
        Self::new(HttpStatus::BadRequest, body)
    }

    pub fn unauthorized(body: T) -> Self {
        Self::new(HttpStatus::Unauthorized, body)
    }

    pub fn forbidden(body: T) -> Self {
        Self::new(HttpStatus::Forbidden, body)
    }

    pub fn not_found(body: T) -> Self {
        Self::new(HttpStatus::NotFound, body)
    }

    pub fn method_not_allowed(body: T) -> Self {
        Self::new(HttpStatus::MethodNotAllowed, body)
    }

    pub fn conflict(body: T) -> Self {
        Self::new(HttpStatus::Conflict, body)
    }

    pub fn internal_server_error(body: T) -> Self {
        Self::new(HttpStatus::InternalServerError, body)
    }

    pub fn service_unavailable(body: T) -> Self {
        Self::new(HttpStatus::ServiceUnavailable, body)
    }

    #[must_use]
    pub fn status(&self) -> HttpStatus {
        self.status
    }

    #[must_use]
    pub fn body(&self) -> &T {
        &self.body
    }

    #[must_use]
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Value of a specific header, if set.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }

    /// Replace the status, chaining.
    #[must_use]
    pub fn with_status(mut self, status: HttpStatus) -> Self {
        self.status = status;
        self
    }

    /// Add or overwrite one header, chaining. Header names are stored
    /// case-sensitively and stay unique.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Replace all headers, chaining.
    #[must_use]
    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Replace the body, chaining.
    #[must_use]
    pub fn with_body(mut self, body: T) -> Self {
        self.body = body;
        self
    }

    /// Decompose into `(status, headers, body)`.
    pub fn into_parts(self) -> (HttpStatus, BTreeMap<String, String>, T) {
        (self.status, self.headers, self.body)
    }
}

impl ResponseEntity<()> {
    /// Body-less envelope with an arbitrary status.
    pub fn empty(status: HttpStatus) -> Self {
        Self::new(status, ())
    }

    /// 204 No Content, body-less by definition.
    pub fn no_content() -> Self {
        Self::empty(HttpStatus::NoContent)
    }
}

impl<T: ResponseBody> ResponseEntity<T> {
    /// Single JSON document describing the whole envelope:
    /// `{statusCode, statusMessage, headers, body}`.
    ///
    /// The body field holds the parsed body when its text is valid JSON,
    /// the raw text otherwise, and `{}` when there is no body.
    #[must_use]
    pub fn to_json_string(&self) -> String {
        let body_text = self.body.to_body_text();
        let body_value = if body_text.is_empty() {
            Value::Object(Map::new())
        } else {
            serde_json::from_str::<Value>(&body_text).unwrap_or(Value::String(body_text))
        };

        let headers: Map<String, Value> = self
            .headers
            .iter()
            .map(|(name, value)| (name.clone(), Value::String(value.clone())))
            .collect();

        json!({
            "statusCode": self.status.as_u16(),
            "statusMessage": self.status.reason_phrase(),
            "headers": headers,
            "body": body_value,
        })
        .to_string()
    }
}

impl<T: Default> Default for ResponseEntity<T> {
    fn default() -> Self {
        Self::new(HttpStatus::Ok, T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Json;
    use serde::Serialize;
    use serde_json::Value;

    #[test]
    fn test_factories_set_status() {
        assert_eq!(ResponseEntity::ok("x").status(), HttpStatus::Ok);
        assert_eq!(ResponseEntity::created("x").status(), HttpStatus::Created);
        assert_eq!(ResponseEntity::not_found("x").status(), HttpStatus::NotFound);
        assert_eq!(
            ResponseEntity::internal_server_error("x").status(),
            HttpStatus::InternalServerError
        );
        assert_eq!(ResponseEntity::no_content().status(), HttpStatus::NoContent);
        assert_eq!(
            ResponseEntity::empty(HttpStatus::Accepted).status(),
            HttpStatus::Accepted
        );
    }

    #[test]
    fn test_fluent_chaining() {
        let entity = ResponseEntity::ok("body")
            .with_status(HttpStatus::Created)
            .with_header("Location", "/api/things/1")
            .with_header("X-Revision", "4");

        assert_eq!(entity.status(), HttpStatus::Created);
        assert_eq!(entity.header("Location"), Some("/api/things/1"));
        assert!(entity.has_header("X-Revision"));
        assert!(!entity.has_header("location"));
    }

    #[test]
    fn test_with_header_overwrites_duplicates() {
        let entity = ResponseEntity::ok(())
            .with_header("X-Mode", "a")
            .with_header("X-Mode", "b");
        assert_eq!(entity.header("X-Mode"), Some("b"));
        assert_eq!(entity.headers().len(), 1);
    }

    #[test]
    fn test_to_json_string_with_json_body() {
        #[derive(Serialize)]
        struct Reading {
            celsius: f64,
        }

        let entity = ResponseEntity::ok(Json(Reading { celsius: 21.5 }))
            .with_header("Content-Type", "application/json");
        let doc: Value = serde_json::from_str(&entity.to_json_string()).unwrap();

        assert_eq!(doc["statusCode"], 200);
        assert_eq!(doc["statusMessage"], "OK");
        assert_eq!(doc["headers"]["Content-Type"], "application/json");
        assert_eq!(doc["body"]["celsius"], 21.5);
    }

    #[test]
    fn test_to_json_string_with_plain_text_body() {
        let entity = ResponseEntity::bad_request("not valid json".to_string());
        let doc: Value = serde_json::from_str(&entity.to_json_string()).unwrap();
        assert_eq!(doc["statusCode"], 400);
        assert_eq!(doc["body"], "not valid json");
    }

    #[test]
    fn test_to_json_string_with_unit_body() {
        let entity = ResponseEntity::no_content();
        let doc: Value = serde_json::from_str(&entity.to_json_string()).unwrap();
        assert_eq!(doc["statusCode"], 204);
        assert!(doc["body"].as_object().unwrap().is_empty());
    }
}
