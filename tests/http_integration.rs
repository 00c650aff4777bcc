//! Integration tests for the assembled HTTP application.
//!
//! Drives `app_router` in-process to check:
//! 1. Health reports live relay counters
//! 2. Init resolves signed and unsigned payloads with roles
//! 3. Static assets are served with an index fallback

use std::collections::HashSet;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use signal_relay::adapters::{app_router, AppState, InMemoryPeer, TelegramIdentityResolver};
use signal_relay::config::{RelayConfig, ServerConfig};
use signal_relay::domain::foundation::UserId;
use signal_relay::domain::identity::sign_hex;
use signal_relay::domain::relay::RelayController;

const BOT_TOKEN: &str = "123456:integration-secret";

// =============================================================================
// Test Infrastructure
// =============================================================================

fn app_with(
    relay: Arc<RelayController>,
    resolver: TelegramIdentityResolver,
    server: &ServerConfig,
) -> Router {
    app_router(
        AppState {
            relay,
            identity: Arc::new(resolver),
            relay_config: RelayConfig::default(),
        },
        server,
    )
}

fn default_app() -> Router {
    app_with(
        Arc::new(RelayController::new()),
        TelegramIdentityResolver::new(None, HashSet::new()),
        &ServerConfig::default(),
    )
}

fn signed_init_data(user_json: &str, token: &str) -> String {
    let pairs = [("auth_date", "1700000000"), ("user", user_json)];
    let check = format!("auth_date=1700000000\nuser={}", user_json);
    let hash = sign_hex(token, &check).unwrap();
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(&pairs)
        .append_pair("hash", &hash)
        .finish()
}

fn post_init(init_data: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/init")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "initData": init_data }).to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn health_counts_connections_and_sessions() {
    let relay = Arc::new(RelayController::new());
    for _ in 0..3 {
        relay.connect(Arc::new(InMemoryPeer::new())).await;
    }
    let app = app_with(
        relay,
        TelegramIdentityResolver::new(None, HashSet::new()),
        &ServerConfig::default(),
    );

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["connections"], 3);
    assert_eq!(body["queue"], 1);
    assert_eq!(body["sessions"], 1);
    assert!(body["timestamp"].as_str().is_some());
}

// =============================================================================
// Init
// =============================================================================

#[tokio::test]
async fn init_verifies_signed_payload_and_assigns_admin_role() {
    let admins: HashSet<UserId> = [UserId::new(42).unwrap()].into_iter().collect();
    let app = app_with(
        Arc::new(RelayController::new()),
        TelegramIdentityResolver::new(Some(BOT_TOKEN.to_string()), admins),
        &ServerConfig::default(),
    );
    let init_data = signed_init_data(r#"{"id":42,"first_name":"Ada","username":"ada"}"#, BOT_TOKEN);

    let response = app.oneshot(post_init(&init_data)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["verified"], true);
    assert_eq!(body["user"]["id"], 42);
    assert_eq!(body["user"]["first_name"], "Ada");
    assert_eq!(body["user"]["last_name"], "");
    assert_eq!(body["user"]["username"], "ada");
    assert_eq!(body["user"]["role"], "admin");
}

#[tokio::test]
async fn init_signed_with_other_token_is_unverified() {
    let app = app_with(
        Arc::new(RelayController::new()),
        TelegramIdentityResolver::new(Some(BOT_TOKEN.to_string()), HashSet::new()),
        &ServerConfig::default(),
    );
    let init_data = signed_init_data(r#"{"id":7,"first_name":"Bob"}"#, "999:other-secret");

    let response = app.oneshot(post_init(&init_data)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["verified"], false);
    assert_eq!(body["user"]["role"], "user");
}

#[tokio::test]
async fn init_without_user_is_bad_request() {
    let response = default_app()
        .oneshot(post_init("auth_date=1700000000"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "no user data");
}

#[tokio::test]
async fn init_with_empty_data_is_bad_request() {
    let response = default_app().oneshot(post_init("")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "missing initData");
}

// =============================================================================
// Static assets
// =============================================================================

fn static_app(dir: &std::path::Path) -> Router {
    let server = ServerConfig {
        static_dir: Some(dir.to_path_buf()),
        ..Default::default()
    };
    app_with(
        Arc::new(RelayController::new()),
        TelegramIdentityResolver::new(None, HashSet::new()),
        &server,
    )
}

#[tokio::test]
async fn static_dir_serves_files_and_falls_back_to_index() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<html>client</html>").unwrap();
    std::fs::write(dir.path().join("app.js"), "console.log('hi');").unwrap();

    let asset = static_app(dir.path())
        .oneshot(Request::builder().uri("/app.js").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(asset.status(), StatusCode::OK);
    assert_eq!(body_text(asset).await, "console.log('hi');");

    let route = static_app(dir.path())
        .oneshot(Request::builder().uri("/room/abc").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(route.status(), StatusCode::OK);
    assert_eq!(body_text(route).await, "<html>client</html>");
}

#[tokio::test]
async fn api_routes_take_precedence_over_static_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<html>client</html>").unwrap();

    let response = static_app(dir.path())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn unknown_route_without_static_dir_is_not_found() {
    let response = default_app()
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
