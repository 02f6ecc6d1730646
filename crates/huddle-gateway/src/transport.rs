//! Delivery of server events to connected sockets.
//!
//! Presence and call handling only see the [`Transport`] trait; the socket
//! side hands each connection's outbox to [`Peers`].

use std::collections::HashMap;

use axum::extract::ws::Message;
use huddle_common::{ConnectionId, ServerEvent};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

/// Per-connection queue drained by the socket writer task.
pub type Outbox = mpsc::Sender<Message>;

/// Fire-and-forget delivery. Neither call waits for the peer, and neither
/// reports failure beyond the returned count.
pub trait Transport {
    /// Queue `event` for `id`. Returns whether it was queued.
    fn send_to(&self, id: &ConnectionId, event: &ServerEvent) -> bool;

    /// Queue `event` for every open connection except `except`.
    /// Returns how many connections it was queued for.
    fn broadcast_except(&self, except: Option<&ConnectionId>, event: &ServerEvent) -> usize;
}

/// Outboxes of every open connection, joined or not.
#[derive(Debug, Default)]
pub struct Peers {
    outboxes: HashMap<ConnectionId, Outbox>,
}

impl Peers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, id: ConnectionId, outbox: Outbox) -> Option<Outbox> {
        self.outboxes.insert(id, outbox)
    }

    pub fn detach(&mut self, id: &ConnectionId) -> bool {
        self.outboxes.remove(id).is_some()
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.outboxes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.outboxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outboxes.is_empty()
    }
}

fn to_ws_message(event: &ServerEvent) -> Option<Message> {
    match event.encode() {
        Ok(text) => Some(Message::Text(text)),
        Err(err) => {
            warn!(event = event.name(), "failed to encode server event: {}", err);
            None
        }
    }
}

fn queue(id: &ConnectionId, outbox: &Outbox, message: Message) -> bool {
    match outbox.try_send(message) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            warn!(%id, "outbox full, dropping signaling message");
            false
        }
        Err(TrySendError::Closed(_)) => {
            debug!(%id, "outbox closed, dropping signaling message");
            false
        }
    }
}

impl Transport for Peers {
    fn send_to(&self, id: &ConnectionId, event: &ServerEvent) -> bool {
        let Some(outbox) = self.outboxes.get(id) else {
            debug!(%id, event = event.name(), "target not connected");
            return false;
        };
        let Some(message) = to_ws_message(event) else {
            return false;
        };
        queue(id, outbox, message)
    }

    fn broadcast_except(&self, except: Option<&ConnectionId>, event: &ServerEvent) -> usize {
        let Some(message) = to_ws_message(event) else {
            return 0;
        };
        self.outboxes
            .iter()
            .filter(|(id, _)| Some(*id) != except)
            .filter(|(id, outbox)| queue(id, outbox, message.clone()))
            .count()
    }
}
