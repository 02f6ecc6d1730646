use std::net::SocketAddr;
use std::path::Path;

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::hub::HubHandle;
use crate::signal::{self, SocketLimits};

#[derive(Debug, Clone)]
pub struct AppState {
    pub hub: HubHandle,
    pub limits: SocketLimits,
}

impl FromRef<AppState> for HubHandle {
    fn from_ref(state: &AppState) -> Self {
        state.hub.clone()
    }
}

impl FromRef<AppState> for SocketLimits {
    fn from_ref(state: &AppState) -> Self {
        state.limits
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

async fn health(State(hub): State<HubHandle>) -> Response {
    match hub.stats().await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(err) => {
            warn!("health check failed: {}", err);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: err.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Signaling socket, health probe, and the static browser client.
///
/// `/call` always serves `index.html`; any other unmatched path is looked
/// up under `public_dir`.
pub fn router(state: AppState, public_dir: &Path) -> Router {
    Router::new()
        .route("/ws", get(signal::ws_handler))
        .route("/health", get(health))
        .route_service("/call", ServeFile::new(public_dir.join("index.html")))
        .fallback_service(ServeDir::new(public_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Browser-facing URL of the call page for a bound listener.
pub fn call_url(bound_addr: SocketAddr) -> String {
    let host = if bound_addr.ip().is_unspecified() {
        "127.0.0.1".to_string()
    } else {
        bound_addr.ip().to_string()
    };
    format!("http://{}:{}/call", host, bound_addr.port())
}
