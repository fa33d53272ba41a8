#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use portfolio_api::config::ServerConfig;
use portfolio_api::relay::ChatRelay;
use portfolio_api::router::build_app_router;
use portfolio_api::state::AppState;
use portfolio_api::ws::WsManager;
use portfolio_core::memory::MemoryStore;
use portfolio_events::EventBus;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        database_url: None,
        db_max_connections: 1,
    }
}

/// Fresh state on an empty in-memory store, with the chat relay running.
pub fn build_test_state() -> AppState {
    let ws_manager = Arc::new(WsManager::new());
    let event_bus = Arc::new(EventBus::default());
    tokio::spawn(ChatRelay::new(Arc::clone(&ws_manager)).run(event_bus.subscribe()));
    AppState::new(
        Arc::new(MemoryStore::new()),
        test_config(),
        ws_manager,
        event_bus,
    )
}

/// Build the full application router with all middleware layers.
///
/// The router is cheap to clone and every clone shares one store, so a test
/// can issue several requests against the same data.
pub fn build_test_app() -> Router {
    build_app_router(build_test_state(), &test_config())
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A project payload with a description holding `objectives`.
pub fn project_payload(title: &str, objectives: &[&str]) -> serde_json::Value {
    let objectives: Vec<serde_json::Value> = objectives
        .iter()
        .map(|text| serde_json::json!({ "text": text }))
        .collect();
    serde_json::json!({
        "title": title,
        "description": "Portfolio site",
        "technologies": ["rust", "axum"],
        "role": "Developer",
        "release_status": "released",
        "desc": {
            "title": "Overview",
            "summary": "What it does",
            "footer": "Thanks",
            "objectives": objectives,
        }
    })
}

/// Create a project through the API and return its JSON.
pub async fn create_project(app: &Router, title: &str, objectives: &[&str]) -> serde_json::Value {
    let response = post_json(app.clone(), "/api/v1/projects", project_payload(title, objectives)).await;
    assert_eq!(response.status(), 201);
    body_json(response).await
}
