//! End-to-end dispatcher scenarios: routing, typed path variables, error
//! documents, and request-id stamping.

use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use twinserve::{
    Dispatcher, HttpRequest, HttpResponse, Json, RequestSource, ResponseEntity,
};

mod common;

fn get(path: &str) -> HttpRequest {
    HttpRequest::new(Method::GET, path, "", "req-test-1", RequestSource::LocalServer)
}

#[derive(Debug, Serialize, Deserialize)]
struct UserProfile {
    id: u32,
    name: String,
}

#[derive(Debug, Deserialize)]
struct CreateUser {
    name: String,
}

fn build_dispatcher() -> Dispatcher {
    common::setup();
    let mut dispatcher = Dispatcher::new();

    dispatcher
        .register(Method::GET, "/api/user/{userId}", |_body, vars| {
            let id: u32 = vars.get_as("userId")?;
            Ok(ResponseEntity::ok(Json(UserProfile {
                id,
                name: format!("user-{id}"),
            }))
            .into())
        })
        .unwrap();

    dispatcher
        .register(Method::POST, "/api/users", |body, _vars| {
            let request: CreateUser = serde_json::from_str(body)?;
            Ok(ResponseEntity::created(Json(UserProfile {
                id: 1,
                name: request.name,
            }))
            .with_header("Location", "/api/users/1")
            .into())
        })
        .unwrap();

    dispatcher
        .register(Method::GET, "/files/{name}", |_body, vars| {
            let name: String = vars.get_as("name")?;
            Ok(ResponseEntity::ok(name).into())
        })
        .unwrap();

    dispatcher
        .register(Method::GET, "/hello/{a}/{b}/{c}", |_body, vars| {
            let joined = format!(
                "{}-{}-{}",
                vars.get("a").unwrap_or_default(),
                vars.get("b").unwrap_or_default(),
                vars.get("c").unwrap_or_default(),
            );
            Ok(ResponseEntity::ok(joined).into())
        })
        .unwrap();

    dispatcher
        .register(Method::POST, "/compute", |_body, _vars| {
            panic!("compute backend is gone");
        })
        .unwrap();

    dispatcher
        .register(Method::DELETE, "/api/user/{userId}", |_body, vars| {
            let _: u32 = vars.get_as("userId")?;
            Ok(ResponseEntity::no_content().into())
        })
        .unwrap();

    dispatcher
}

#[test]
fn test_get_with_typed_path_variable() {
    let dispatcher = build_dispatcher();
    let response = dispatcher.dispatch(&get("/api/user/42"));

    assert_eq!(response.status_code, 200);
    assert_eq!(response.status_message, "OK");
    let body: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body["id"], 42);
    assert_eq!(body["name"], "user-42");
    assert_eq!(response.request_id, "req-test-1");
    assert_eq!(response.source, RequestSource::LocalServer);
}

#[test]
fn test_post_created_with_location_header() {
    let dispatcher = build_dispatcher();
    let request = HttpRequest::new(
        Method::POST,
        "/api/users",
        "{\"name\":\"Alice\"}",
        "req-create",
        RequestSource::CloudServer,
    );
    let response = dispatcher.dispatch(&request);

    assert_eq!(response.status_code, 201);
    assert_eq!(response.status_message, "Created");
    assert_eq!(response.headers["Location"], "/api/users/1");
    let body: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body["name"], "Alice");
    assert_eq!(response.source, RequestSource::CloudServer);
}

#[test]
fn test_unmatched_path_returns_not_found_document() {
    let dispatcher = build_dispatcher();
    let response = dispatcher.dispatch(&get("/unknown/path"));

    assert_eq!(response.status_code, 404);
    assert_eq!(
        response.body,
        "{\"error\":\"Not Found\",\"message\":\"No pattern matched for URL: /unknown/path\"}"
    );
    assert_eq!(response.request_id, "req-test-1");
}

#[test]
fn test_path_variable_is_percent_decoded() {
    let dispatcher = build_dispatcher();
    let response = dispatcher.dispatch(&get("/files/My%20File.txt"));

    assert_eq!(response.status_code, 200);
    assert_eq!(response.body, "My File.txt");
}

#[test]
fn test_three_variables_bind_in_one_request() {
    let dispatcher = build_dispatcher();
    let response = dispatcher.dispatch(&get("/hello/x/y/z"));

    assert_eq!(response.status_code, 200);
    assert_eq!(response.body, "x-y-z");
}

#[test]
fn test_handler_panic_becomes_internal_server_error() {
    let dispatcher = build_dispatcher();
    let request = HttpRequest::new(
        Method::POST,
        "/compute",
        "{}",
        "req-compute",
        RequestSource::LocalServer,
    );
    let response = dispatcher.dispatch(&request);

    assert_eq!(response.status_code, 500);
    let body: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body["error"], "Internal Server Error");
    assert_eq!(response.request_id, "req-compute");
}

#[test]
fn test_handler_error_reports_its_message() {
    let dispatcher = build_dispatcher();
    // Conversion failure inside the handler surfaces through `?`.
    let response = dispatcher.dispatch(&get("/api/user/not-a-number"));

    assert_eq!(response.status_code, 500);
    let body: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body["error"], "Internal Server Error");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("unsigned integer"));
}

#[test]
fn test_matched_pattern_with_unmapped_method_is_not_found() {
    let dispatcher = build_dispatcher();
    let request = HttpRequest::new(
        Method::PUT,
        "/api/user/42",
        "",
        "req-put",
        RequestSource::LocalServer,
    );
    let response = dispatcher.dispatch(&request);

    assert_eq!(response.status_code, 404);
    let body: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body["error"], "Not Found");
}

#[test]
fn test_same_pattern_under_two_methods() {
    let dispatcher = build_dispatcher();

    let get_response = dispatcher.dispatch(&get("/api/user/7"));
    assert_eq!(get_response.status_code, 200);

    let delete = HttpRequest::new(
        Method::DELETE,
        "/api/user/7",
        "",
        "req-del",
        RequestSource::LocalServer,
    );
    let delete_response = dispatcher.dispatch(&delete);
    assert_eq!(delete_response.status_code, 204);
    assert_eq!(delete_response.body, "");
}

#[test]
fn test_handler_set_request_id_is_preserved() {
    common::setup();
    let mut dispatcher = Dispatcher::new();
    dispatcher
        .register(Method::GET, "/custom", |_body, _vars| {
            Ok(HttpResponse::ok().with_request_id("handler-chosen"))
        })
        .unwrap();

    let response = dispatcher.dispatch(&get("/custom"));
    assert_eq!(response.request_id, "handler-chosen");
}
