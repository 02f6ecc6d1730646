//! Huddle gateway: presence and call-invitation signaling for browser
//! peers.
//!
//! Clients connect over `/ws`, announce themselves with `join`, and use
//! `call-user` / `accept-call` to swap the connection ids they need to
//! open a direct media session. All state lives in one [`hub::Hub`] task.

#![forbid(unsafe_code)]

pub mod config;
pub mod handshake;
pub mod hub;
pub mod presence;
pub mod registry;
pub mod signal;
pub mod transport;
pub mod web;

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;

pub use config::GatewayConfig;
pub use huddle_common::{Error, Result};
pub use hub::{HubHandle, HubStats};
pub use registry::Registry;
pub use signal::SocketLimits;
pub use web::{call_url, router, AppState};

/// Serve `app` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await?;
    Ok(())
}
