//! HTTP surface: health probe and the static call page.

use std::path::PathBuf;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use huddle_gateway::{AppState, HubHandle, SocketLimits};
use serde_json::Value;
use tower::ServiceExt;

const INDEX_HTML: &str = "<!doctype html><title>huddle test</title>";

fn public_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);
    std::fs::create_dir_all(&dir).expect("Failed to create public dir");
    std::fs::write(dir.join("index.html"), INDEX_HTML).expect("Failed to write index.html");
    std::fs::write(dir.join("app.js"), "console.log('huddle');").expect("Failed to write app.js");
    dir
}

fn app(public: &std::path::Path) -> axum::Router {
    let (hub, _task) = HubHandle::spawn(16);
    huddle_gateway::router(
        AppState {
            hub,
            limits: SocketLimits::default(),
        },
        public,
    )
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

#[tokio::test]
async fn test_health_reports_hub_counts() {
    let dir = public_dir("http-health");
    let (status, body) = get(app(&dir), "/health").await;

    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["connections"], 0);
    assert_eq!(value["online_users"], 0);
}

#[tokio::test]
async fn test_call_serves_index() {
    let dir = public_dir("http-call");
    let (status, body) = get(app(&dir), "/call").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, INDEX_HTML.as_bytes());
}

#[tokio::test]
async fn test_static_assets_and_missing_files() {
    let dir = public_dir("http-static");

    let (status, body) = get(app(&dir), "/app.js").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"console.log('huddle');");

    let (status, _) = get(app(&dir), "/missing.css").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
