//! Tests for the client and its context

use super::*;
use crate::auth::{AppAuth, Auth, CachedToken, UserAuth};
use crate::config::{AuthMode, ClientConfig};
use crate::http::TokenEndpoints;
use crate::query::UsergridQuery;
use crate::response::User;
use std::sync::Arc;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> ClientConfig {
    ClientConfig::new("acme", "sandbox").base_url(server.uri())
}

fn authenticated_app(token: &str) -> Arc<AppAuth> {
    let app = Arc::new(AppAuth::new("id", "secret"));
    Auth::from(Arc::clone(&app))
        .store_token(CachedToken::expires_in_millis(token.to_string(), 60_000).unwrap());
    app
}

async fn mount_user_token(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/acme/sandbox/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token,
            "expires_in": 60_000,
            "user": {"uuid": "u1", "type": "user", "username": "alice"}
        })))
        .mount(server)
        .await;
}

// ============================================================================
// Context
// ============================================================================

#[test]
fn test_context_urls() {
    let context = ClientContext::new(
        ClientConfig::new("acme", "sandbox").base_url("https://api.example.com/"),
    );
    assert_eq!(context.client_app_url(), "https://api.example.com/acme/sandbox");
    assert_eq!(context.management_url(), "https://api.example.com/management");
}

#[test]
fn test_context_builds_app_auth_from_config() {
    let context =
        ClientContext::new(ClientConfig::new("acme", "sandbox").app_credentials("id", "secret"));
    assert_eq!(context.app_auth().unwrap().client_id(), "id");

    let bare = ClientContext::new(ClientConfig::new("acme", "sandbox"));
    assert!(bare.app_auth().is_none());
}

#[test]
fn test_auth_for_requests_app_mode() {
    let context = ClientContext::new(ClientConfig::new("acme", "sandbox").auth_mode(AuthMode::App));
    assert!(context.auth_for_requests().is_none());

    let app = authenticated_app("app-token");
    context.set_app_auth(Some(Arc::clone(&app)));
    let auth = context.auth_for_requests().unwrap();
    assert!(auth.ptr_eq(&Auth::App(app)));
}

#[test]
fn test_auth_for_requests_skips_expired_app_token() {
    let context = ClientContext::new(ClientConfig::new("acme", "sandbox").auth_mode(AuthMode::App));
    let app = Arc::new(AppAuth::new("id", "secret"));
    Auth::from(Arc::clone(&app)).store_token(CachedToken::expires_in_millis("t".to_string(), -1).unwrap());
    context.set_app_auth(Some(app));

    assert!(context.auth_for_requests().is_none());
}

#[test]
fn test_auth_for_requests_user_mode() {
    let context = ClientContext::new(ClientConfig::new("acme", "sandbox"));
    assert!(context.auth_for_requests().is_none());

    let user_auth = Arc::new(UserAuth::new("alice", "pw"));
    Auth::from(Arc::clone(&user_auth))
        .store_token(CachedToken::expires_in_millis("user-token".to_string(), 60_000).unwrap());
    let mut user = User::default();
    user.set_user_auth(user_auth);
    context.set_current_user(Some(user));

    let auth = context.auth_for_requests().unwrap();
    assert_eq!(auth.access_token().as_deref(), Some("user-token"));
}

#[test]
fn test_auth_for_requests_none_mode() {
    let context = ClientContext::new(ClientConfig::new("acme", "sandbox").auth_mode(AuthMode::None));
    context.set_app_auth(Some(authenticated_app("app-token")));
    assert!(context.auth_for_requests().is_none());
}

#[test]
fn test_temp_auth_is_used_once() {
    let context = ClientContext::new(ClientConfig::new("acme", "sandbox").auth_mode(AuthMode::None));
    context.set_temp_auth(Some(Auth::App(authenticated_app("temp"))));

    let first = context.auth_for_requests().unwrap();
    assert_eq!(first.access_token().as_deref(), Some("temp"));
    assert!(context.auth_for_requests().is_none());
}

#[test]
fn test_invalid_temp_auth_falls_back() {
    let context = ClientContext::new(ClientConfig::new("acme", "sandbox").auth_mode(AuthMode::App));
    context.set_app_auth(Some(authenticated_app("app-token")));
    context.set_temp_auth(Some(Auth::from(AppAuth::new("other", "secret"))));

    let auth = context.auth_for_requests().unwrap();
    assert_eq!(auth.access_token().as_deref(), Some("app-token"));
}

// ============================================================================
// Client
// ============================================================================

#[test]
fn test_new_rejects_invalid_config() {
    let err = Client::new(ClientConfig::new("", "sandbox")).unwrap_err();
    assert!(err.to_string().contains("org_id"));
}

#[tokio::test]
async fn test_authenticate_app_without_credentials() {
    let mock_server = MockServer::start().await;
    let client = Client::new(config(&mock_server)).unwrap();

    let response = client.authenticate_app().await;
    assert!(!response.ok());
    assert_eq!(response.error().unwrap().name, "auth_error");
}

#[tokio::test]
async fn test_authenticate_app_then_requests_use_app_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/acme/sandbox/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "app-token",
            "expires_in": 60_000
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/acme/sandbox/dogs"))
        .and(header("authorization", "Bearer app-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"entities": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::new(
        config(&mock_server)
            .auth_mode(AuthMode::App)
            .app_credentials("id", "secret"),
    )
    .unwrap();

    assert!(client.authenticate_app().await.ok());
    assert!(client.get("dogs", None).await.ok());
}

#[tokio::test]
async fn test_authenticate_user_sets_current_user() {
    let mock_server = MockServer::start().await;
    mount_user_token(&mock_server, "user-token").await;

    let client = Client::new(config(&mock_server)).unwrap();
    let response = client
        .authenticate_user(UserAuth::new("alice", "pw"), true)
        .await;

    assert!(response.ok());
    let user = client.current_user().unwrap();
    assert_eq!(user.username.as_deref(), Some("alice"));
    assert_eq!(
        user.user_auth().unwrap().access_token().as_deref(),
        Some("user-token")
    );
}

#[tokio::test]
async fn test_authenticate_user_without_set_as_current() {
    let mock_server = MockServer::start().await;
    mount_user_token(&mock_server, "user-token").await;

    let client = Client::new(config(&mock_server)).unwrap();
    let response = client
        .authenticate_user(UserAuth::new("alice", "pw"), false)
        .await;

    assert!(response.ok());
    assert!(client.current_user().is_none());
}

#[tokio::test]
async fn test_logout_revokes_and_clears() {
    let mock_server = MockServer::start().await;
    mount_user_token(&mock_server, "user-token").await;

    Mock::given(method("PUT"))
        .and(path("/acme/sandbox/users/u1/revoketoken"))
        .and(query_param("token", "user-token"))
        .and(header("authorization", "Bearer user-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::new(config(&mock_server)).unwrap();
    client
        .authenticate_user(UserAuth::new("alice", "pw"), true)
        .await;
    let user_auth = client.current_user().unwrap().user_auth().cloned().unwrap();

    let response = client.logout_current_user().await;

    assert!(response.ok());
    assert!(client.current_user().is_none());
    assert!(user_auth.access_token().is_none());
}

#[tokio::test]
async fn test_logout_without_current_user() {
    let mock_server = MockServer::start().await;
    let client = Client::new(config(&mock_server)).unwrap();

    let response = client.logout_current_user().await;
    assert!(!response.ok());
}

#[tokio::test]
async fn test_using_auth_applies_to_next_request_only() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/acme/sandbox/dogs/fido"))
        .and(header("authorization", "Bearer temp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::new(config(&mock_server).auth_mode(AuthMode::None)).unwrap();
    client
        .using_auth(authenticated_app("temp"))
        .get_entity("dogs", "fido")
        .await;
    client.get_entity("dogs", "fido").await;

    let received = mock_server.received_requests().await.unwrap();
    assert_eq!(received.len(), 2);
    assert!(received[1].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_crud_wrappers() {
    let mock_server = MockServer::start().await;

    Mock::given(path("/acme/sandbox/dogs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"entities": []})))
        .mount(&mock_server)
        .await;
    Mock::given(path("/acme/sandbox/dogs/fido"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"entities": []})))
        .mount(&mock_server)
        .await;

    let client = Client::new(config(&mock_server)).unwrap();
    assert!(client.post("dogs", json!({"name": "fido"})).await.ok());
    assert!(client.put("dogs", "fido", json!({"age": 4})).await.ok());
    assert!(client.delete("dogs", "fido").await.ok());

    let received = mock_server.received_requests().await.unwrap();
    let methods: Vec<&str> = received.iter().map(|r| r.method.as_str()).collect();
    assert_eq!(methods, vec!["POST", "PUT", "DELETE"]);
    assert_eq!(received[0].body, br#"{"name":"fido"}"#.to_vec());
}

#[tokio::test]
async fn test_get_with_query_and_next_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/acme/sandbox/dogs"))
        .and(query_param("cursor", "c2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entities": [{"type": "dog", "name": "rex"}]
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/acme/sandbox/dogs"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entities": [{"type": "dog", "name": "fido"}],
            "cursor": "c2"
        })))
        .mount(&mock_server)
        .await;

    let client = Client::new(config(&mock_server)).unwrap();
    let first = client
        .get("dogs", Some(UsergridQuery::new().limit(1)))
        .await;
    assert_eq!(first.first().unwrap().name.as_deref(), Some("fido"));

    let second = client.next_page(&first).await.unwrap();
    assert_eq!(second.first().unwrap().name.as_deref(), Some("rex"));
    assert!(client.next_page(&second).await.is_none());
}

#[tokio::test]
async fn test_next_page_replaces_query_cursor() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/acme/sandbox/dogs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entities": [{"type": "dog", "name": "fido"}],
            "cursor": "c2"
        })))
        .mount(&mock_server)
        .await;

    let client = Client::new(config(&mock_server)).unwrap();
    let first = client
        .get("dogs", Some(UsergridQuery::new().limit(10).cursor("c1")))
        .await;
    client.next_page(&first).await.unwrap();

    let received = mock_server.received_requests().await.unwrap();
    assert_eq!(received.len(), 2);
    let cursors: Vec<String> = received[1]
        .url
        .query_pairs()
        .filter(|(k, _)| k == "cursor")
        .map(|(_, v)| v.into_owned())
        .collect();
    assert_eq!(cursors, vec!["c2".to_string()]);
    assert_eq!(received[1].url.query(), Some("limit=10&cursor=c2"));
}
