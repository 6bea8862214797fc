//! Tests for response normalization

use super::*;
use crate::error::Error;
use crate::query::UsergridQuery;
use crate::request::RequestDescriptor;
use crate::types::{JsonValue, Method, StringMap};
use serde_json::json;
use pretty_assertions::assert_eq;

fn parse(status: u16, body: JsonValue) -> Response {
    Response::from_body(status, StringMap::new(), &body.to_string(), None)
}

#[test]
fn test_token_response() {
    let response = parse(
        200,
        json!({"access_token": "abc", "expires_in": 600_000, "application": "app-uuid"}),
    );
    assert!(response.ok());
    assert_eq!(response.access_token(), Some("abc"));
    assert_eq!(response.expires(), Some(600_000));
    assert!(response.user().is_none());
}

#[test]
fn test_token_response_without_expiry() {
    let response = parse(200, json!({"access_token": "abc"}));
    assert!(response.ok());
    assert_eq!(response.access_token(), Some("abc"));
    assert_eq!(response.expires(), None);
}

#[test]
fn test_expires_as_string() {
    let response = parse(200, json!({"access_token": "abc", "expires_in": "1000"}));
    assert_eq!(response.expires(), Some(1000));
}

#[test]
fn test_empty_token_is_absent() {
    let response = parse(200, json!({"access_token": "", "expires_in": 1000}));
    assert_eq!(response.access_token(), None);
}

#[test]
fn test_user_from_token_response() {
    let response = parse(
        200,
        json!({
            "access_token": "abc",
            "expires_in": 1000,
            "user": {
                "uuid": "5c0b3a1e",
                "type": "user",
                "username": "alice",
                "email": "alice@example.com",
                "activated": true,
                "nickname": "al"
            }
        }),
    );
    let user = response.user().unwrap();
    assert_eq!(user.username.as_deref(), Some("alice"));
    assert!(user.activated);
    assert_eq!(user.properties["nickname"], "al");
    assert!(user.user_auth().is_none());
}

#[test]
fn test_user_from_first_entity() {
    let response = parse(
        200,
        json!({"entities": [{"type": "user", "uuid": "u1", "username": "bob"}]}),
    );
    assert_eq!(response.user().unwrap().uuid_or_username(), Some("u1"));
}

#[test]
fn test_entities_and_cursor() {
    let response = parse(
        200,
        json!({
            "entities": [
                {"type": "dog", "uuid": "d1", "name": "fido", "age": 3},
                {"type": "dog", "uuid": "d2", "name": "rex"}
            ],
            "cursor": "LTU2ODc0MzQz"
        }),
    );
    assert_eq!(response.entities().len(), 2);
    let first = response.first().unwrap();
    assert_eq!(first.entity_type, "dog");
    assert_eq!(first.name.as_deref(), Some("fido"));
    assert_eq!(first.get("age"), Some(&json!(3)));
    assert!(response.user().is_none());
    assert!(response.has_next_page());
    assert_eq!(response.cursor(), Some("LTU2ODc0MzQz"));
}

#[test]
fn test_error_body() {
    let response = parse(
        400,
        json!({
            "error": "invalid_grant",
            "error_description": "invalid username or password",
            "exception": "org.apache.usergrid.management.exceptions.InvalidGrantException"
        }),
    );
    assert!(!response.ok());
    let error = response.error().unwrap();
    assert_eq!(error.name, "invalid_grant");
    assert_eq!(
        error.description.as_deref(),
        Some("invalid username or password")
    );
    assert!(error.exception.is_some());
}

#[test]
fn test_error_status_without_body() {
    let response = Response::from_body(503, StringMap::new(), "", None);
    assert!(!response.ok());
    assert_eq!(
        response.error().unwrap(),
        &ResponseError::new("http_error", Some("Service Unavailable".to_string()))
    );
    assert!(response.raw().is_none());
}

#[test]
fn test_non_json_success_body() {
    let response = Response::from_body(200, StringMap::new(), "pong", None);
    assert!(response.ok());
    assert!(response.raw().is_none());
    assert!(response.entities().is_empty());
}

#[test]
fn test_from_error_is_not_ok() {
    let response = Response::from_error(&Error::auth("no"));
    assert!(!response.ok());
    assert_eq!(response.status(), 0);
    assert_eq!(response.error().unwrap().name, "auth_error");
    assert!(response.access_token().is_none());
}

#[test]
fn test_header_lookup_is_case_insensitive() {
    let headers = StringMap::from([("content-type".to_string(), "application/json".to_string())]);
    let response = Response::from_body(200, headers, "{}", None);
    assert_eq!(response.header("Content-Type"), Some("application/json"));
    assert_eq!(response.header("x-missing"), None);
}

#[test]
fn test_next_page_request_adds_cursor() {
    let request = RequestDescriptor::builder(Method::GET, "https://x/org/app")
        .path("dogs")
        .query(UsergridQuery::new().limit(1))
        .build();
    let response = Response::from_body(
        200,
        StringMap::new(),
        &json!({"entities": [], "cursor": "c2"}).to_string(),
        Some(request),
    );

    let next = response.next_page_request().unwrap();
    assert_eq!(
        next.construct_url().unwrap().as_str(),
        "https://x/org/app/dogs?limit=1&cursor=c2"
    );
}

#[test]
fn test_no_next_page_without_cursor() {
    let request = RequestDescriptor::builder(Method::GET, "https://x").build();
    let response = Response::from_body(200, StringMap::new(), "{}", Some(request));
    assert!(response.next_page_request().is_none());
}

#[test]
fn test_to_json_summary() {
    let response = parse(404, json!({"error": "not_found"}));
    let summary = response.to_json();
    assert_eq!(summary["status"], 404);
    assert_eq!(summary["ok"], false);
    assert_eq!(summary["error"]["name"], "not_found");
    assert_eq!(summary["body"]["error"], "not_found");
}
