#![forbid(unsafe_code)]

//! Huddle gateway - presence and call signaling for browser peers.

use anyhow::Result;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};

use huddle_gateway::{AppState, GatewayConfig, HubHandle, SocketLimits};

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = GatewayConfig::parse();

    let filter = format!("{},hyper=warn,tokio=warn", config.log_level);
    huddle_common::init_tracing_with_default(&filter);

    config.validate()?;
    info!("Starting huddle-gateway v{}", env!("CARGO_PKG_VERSION"));

    if !config.index_file().is_file() {
        warn!(
            "{} not found; /call will respond 404",
            config.index_file().display()
        );
    }

    let (hub, hub_task) = HubHandle::spawn(config.hub_capacity);
    let state = AppState {
        hub,
        limits: SocketLimits {
            outbox_capacity: config.outbox_capacity,
            max_message_bytes: config.max_message_bytes,
        },
    };
    let app = huddle_gateway::router(state, &config.public_dir);

    let listener = TcpListener::bind(config.bind_addr()?).await?;
    let bound_addr = listener.local_addr()?;
    info!("server running on {}", huddle_gateway::call_url(bound_addr));

    huddle_gateway::serve(listener, app, shutdown_signal()).await?;

    hub_task.abort();
    info!("huddle-gateway stopped");
    Ok(())
}
