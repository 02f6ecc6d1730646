use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        ConnectInfo, State,
    },
    response::IntoResponse,
};
use futures::{stream::StreamExt, SinkExt};
use huddle_common::{ClientEvent, ConnectionId};
use std::net::SocketAddr;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::{DEFAULT_MAX_MESSAGE_BYTES, DEFAULT_OUTBOX_CAPACITY};
use crate::hub::HubHandle;

/// Per-socket buffer and frame limits.
#[derive(Debug, Clone, Copy)]
pub struct SocketLimits {
    pub outbox_capacity: usize,
    pub max_message_bytes: usize,
}

impl Default for SocketLimits {
    fn default() -> Self {
        Self {
            outbox_capacity: DEFAULT_OUTBOX_CAPACITY,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(hub): State<HubHandle>,
    State(limits): State<SocketLimits>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> impl IntoResponse {
    ws.max_message_size(limits.max_message_bytes)
        .max_frame_size(limits.max_message_bytes)
        .on_upgrade(move |socket| handle_socket(socket, hub, limits, addr))
}

async fn handle_socket(stream: WebSocket, hub: HubHandle, limits: SocketLimits, addr: SocketAddr) {
    let id = ConnectionId::generate();
    info!(%id, "client connecting from {}", addr);
    let (mut sender, mut receiver) = stream.split();
    let (tx, mut rx) = mpsc::channel::<Message>(limits.outbox_capacity.max(1));

    let (disconnect_tx, mut disconnect_rx) = mpsc::channel::<()>(1);

    // Ends once the hub drops the outbox or the peer stops reading.
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
        let _ = disconnect_tx.try_send(());
    });

    if let Err(err) = hub.attach(id, tx).await {
        warn!(%id, "dropping connection: {}", err);
        return;
    }

    loop {
        tokio::select! {
            _ = disconnect_rx.recv() => {
                break;
            }
            msg = receiver.next() => {
                let Some(msg) = msg else { break; };
                let msg = match msg {
                    Ok(msg) => msg,
                    Err(err) => {
                        debug!(%id, "socket error: {}", err);
                        break;
                    }
                };

                let text = match msg {
                    Message::Text(text) => text,
                    Message::Binary(_) => {
                        debug!(%id, "ignoring binary frame");
                        continue;
                    }
                    Message::Close(_) => break,
                    Message::Ping(_) | Message::Pong(_) => continue,
                };

                let event = match ClientEvent::decode(&text) {
                    Ok(event) => event,
                    Err(err) => {
                        warn!(%id, "ignoring invalid frame from {}: {}", addr, err);
                        continue;
                    }
                };

                if let Err(err) = hub.dispatch(id, event).await {
                    warn!(%id, "dropping connection: {}", err);
                    break;
                }
            }
        }
    }

    if let Err(err) = hub.detach(id).await {
        warn!(%id, "failed to detach connection: {}", err);
    }
    info!(%id, "client disconnected: {}", addr);
}
