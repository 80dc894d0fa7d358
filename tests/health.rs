//! Integration tests for GET /api/health and cross-cutting middleware.
//!
//! Verifies that:
//! - GET /api/health returns {"status":"ok"} without touching the upstream
//! - Every response carries an x-request-id header
//! - CORS accepts any origin, method and header, with credentials

use axum::body::Body;
use http::{Request, StatusCode};
use tower::ServiceExt;

use chat_relay::config::Config;
use chat_relay::proxy::{create_router, AppState, REQUEST_ID_HEADER};

/// App whose upstream is unreachable; nothing here should need it.
fn setup_app() -> axum::Router {
    let mut config = Config::default();
    config.upstream.base_url = "http://127.0.0.1:1/v1".to_string();
    create_router(AppState::with_client(config, reqwest::Client::new()))
}

#[tokio::test]
async fn health_ok_without_upstream() {
    let app = setup_app();

    let request = Request::get("/api/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), 1024)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json, serde_json::json!({"status": "ok"}));
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = setup_app();

    let request = Request::get("/api/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    let id = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .expect("request id header")
        .to_str()
        .unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok(), "not a UUID: {}", id);
}

#[tokio::test]
async fn request_ids_are_unique() {
    let app = setup_app();

    let first = app
        .clone()
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let second = app
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_ne!(
        first.headers()[REQUEST_ID_HEADER],
        second.headers()[REQUEST_ID_HEADER]
    );
}

#[tokio::test]
async fn cors_preflight_allows_any_origin_with_credentials() {
    let app = setup_app();

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/chat")
        .header("origin", "https://app.example.com")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type,x-custom")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers["access-control-allow-origin"],
        "https://app.example.com"
    );
    assert_eq!(headers["access-control-allow-credentials"], "true");
    assert_eq!(headers["access-control-allow-methods"], "POST");
    assert_eq!(
        headers["access-control-allow-headers"],
        "content-type,x-custom"
    );
}

#[tokio::test]
async fn cors_headers_on_simple_request() {
    let app = setup_app();

    let request = Request::get("/api/health")
        .header("origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:3000"
    );
}

#[tokio::test]
async fn unknown_route_is_404() {
    let app = setup_app();

    let request = Request::get("/api/unknown").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
