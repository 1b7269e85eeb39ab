//! Wire response delivered to a transport.

use std::collections::BTreeMap;

use crate::body::ResponseBody;
use crate::entity::ResponseEntity;
use crate::status::HttpStatus;

use super::transport::RequestSource;

/// Serialized response artifact: everything a transport needs to answer
/// the request identified by `request_id` on the right side of the device.
///
/// The dispatcher stamps `request_id` and `source` from the originating
/// request after the handler returns; until then both carry their
/// defaults (empty id, local source).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub request_id: String,
    pub source: RequestSource,
    pub status_code: u16,
    pub status_message: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(
        status_code: u16,
        status_message: impl Into<String>,
        headers: BTreeMap<String, String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            request_id: String::new(),
            source: RequestSource::LocalServer,
            status_code,
            status_message: status_message.into(),
            headers,
            body: body.into(),
        }
    }

    /// 200 OK with no headers and no body.
    #[must_use]
    pub fn ok() -> Self {
        Self::new(200, "OK", BTreeMap::new(), "")
    }

    /// 200 OK carrying the textual form of `body`, with the default
    /// `Content-Type: application/json` header.
    #[must_use]
    pub fn ok_from<T: ResponseBody>(body: &T) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self::new(200, "OK", headers, body.to_body_text())
    }

    /// Chain a request id onto the response.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    /// Render the HTTP/1.1 text form: status line, headers, blank line,
    /// body.
    #[must_use]
    pub fn to_http_string(&self) -> String {
        let mut wire = String::with_capacity(64 + self.body.len());
        wire.push_str("HTTP/1.1 ");
        wire.push_str(&self.status_code.to_string());
        wire.push(' ');
        wire.push_str(&self.status_message);
        wire.push_str("\r\n");
        for (name, value) in &self.headers {
            wire.push_str(name);
            wire.push_str(": ");
            wire.push_str(value);
            wire.push_str("\r\n");
        }
        wire.push_str("\r\n");
        wire.push_str(&self.body);
        wire
    }
}

impl<T: ResponseBody> From<ResponseEntity<T>> for HttpResponse {
    fn from(entity: ResponseEntity<T>) -> Self {
        let (status, headers, body) = entity.into_parts();
        Self::new(
            status.as_u16(),
            status.reason_phrase(),
            headers,
            body.to_body_text(),
        )
    }
}

impl From<HttpStatus> for HttpResponse {
    fn from(status: HttpStatus) -> Self {
        ResponseEntity::empty(status).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Json;
    use serde::Serialize;

    #[test]
    fn test_entity_conversion_carries_status_and_body() {
        let entity = ResponseEntity::created("payload".to_string())
            .with_header("Location", "/api/things/1");
        let response = HttpResponse::from(entity);

        assert_eq!(response.status_code, 201);
        assert_eq!(response.status_message, "Created");
        assert_eq!(response.headers["Location"], "/api/things/1");
        assert_eq!(response.body, "payload");
        assert_eq!(response.request_id, "");
        assert_eq!(response.source, RequestSource::LocalServer);
    }

    #[test]
    fn test_unit_entity_has_empty_body() {
        let response = HttpResponse::from(ResponseEntity::no_content());
        assert_eq!(response.status_code, 204);
        assert_eq!(response.body, "");
    }

    #[test]
    fn test_ok_from_sets_json_content_type() {
        #[derive(Serialize)]
        struct Ping {
            up: bool,
        }

        let response = HttpResponse::ok_from(&Json(Ping { up: true }));
        assert_eq!(response.status_code, 200);
        assert_eq!(response.headers["Content-Type"], "application/json");
        assert_eq!(response.body, "{\"up\":true}");

        let scalar = HttpResponse::ok_from(&42u32);
        assert_eq!(scalar.body, "42");
    }

    #[test]
    fn test_to_http_string_framing() {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        let response = HttpResponse::new(404, "Not Found", headers, "{\"error\":\"Not Found\"}");

        assert_eq!(
            response.to_http_string(),
            "HTTP/1.1 404 Not Found\r\nContent-Type: application/json\r\n\r\n{\"error\":\"Not Found\"}"
        );
    }

    #[test]
    fn test_to_http_string_without_headers_or_body() {
        assert_eq!(HttpResponse::ok().to_http_string(), "HTTP/1.1 200 OK\r\n\r\n");
    }
}
