//! Single-owner signaling hub.
//!
//! One task owns the [`Registry`] and every connection's outbox, and
//! applies [`HubCommand`]s strictly one at a time. Socket tasks only hold
//! a [`HubHandle`], so registry reads and writes never race.

use huddle_common::{ClientEvent, ConnectionId, Error, Result, ServerEvent, Welcome};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::handshake;
use crate::presence;
use crate::registry::Registry;
use crate::transport::{Outbox, Peers, Transport};

/// Work items for the hub task.
#[derive(Debug)]
pub enum HubCommand {
    /// A socket opened; `outbox` feeds its writer task.
    Attach { id: ConnectionId, outbox: Outbox },
    Inbound { id: ConnectionId, event: ClientEvent },
    /// The socket closed.
    Detach { id: ConnectionId },
    Stats { reply: oneshot::Sender<HubStats> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HubStats {
    /// Open sockets, joined or not.
    pub connections: usize,
    pub online_users: usize,
}

/// Registry plus outboxes, mutated only through [`Hub::apply`].
#[derive(Debug, Default)]
pub struct Hub {
    registry: Registry,
    peers: Peers,
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, command: HubCommand) {
        match command {
            HubCommand::Attach { id, outbox } => self.connect(id, outbox),
            HubCommand::Inbound { id, event } => self.dispatch(id, event),
            HubCommand::Detach { id } => self.disconnect(id),
            HubCommand::Stats { reply } => {
                let _ = reply.send(self.stats());
            }
        }
    }

    pub fn connect(&mut self, id: ConnectionId, outbox: Outbox) {
        if self.peers.attach(id, outbox).is_some() {
            debug!(%id, "replaced outbox for existing connection");
        }
        self.peers.send_to(&id, &ServerEvent::Welcome(Welcome { id }));
        debug!(%id, connections = self.peers.len(), "connection attached");
    }

    pub fn dispatch(&mut self, id: ConnectionId, event: ClientEvent) {
        debug!(%id, event = event.name(), "dispatching client event");
        match event {
            ClientEvent::Join { username } => {
                presence::announce_join(&mut self.registry, &self.peers, id, &username);
            }
            ClientEvent::CallUser(call) => {
                handshake::relay_invite(&self.peers, call);
            }
            ClientEvent::AcceptCall(accept) => {
                handshake::relay_accept(&self.peers, accept);
            }
        }
    }

    /// Evict `id` immediately. Every disconnect produces one `user-left`.
    pub fn disconnect(&mut self, id: ConnectionId) {
        self.peers.detach(&id);
        presence::announce_leave(&mut self.registry, &self.peers, id);
    }

    pub fn stats(&self) -> HubStats {
        HubStats {
            connections: self.peers.len(),
            online_users: self.registry.len(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

/// Cloneable sender side of the hub task.
#[derive(Debug, Clone)]
pub struct HubHandle {
    tx: mpsc::Sender<HubCommand>,
}

impl HubHandle {
    /// Start the hub task with a command queue of `capacity`.
    pub fn spawn(capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let task = tokio::spawn(run(Hub::new(), rx));
        (Self { tx }, task)
    }

    async fn submit(&self, command: HubCommand) -> Result<()> {
        self.tx
            .send(command)
            .await
            .map_err(|_| Error::internal("signaling hub is not running"))
    }

    pub async fn attach(&self, id: ConnectionId, outbox: Outbox) -> Result<()> {
        self.submit(HubCommand::Attach { id, outbox }).await
    }

    pub async fn dispatch(&self, id: ConnectionId, event: ClientEvent) -> Result<()> {
        self.submit(HubCommand::Inbound { id, event }).await
    }

    pub async fn detach(&self, id: ConnectionId) -> Result<()> {
        self.submit(HubCommand::Detach { id }).await
    }

    pub async fn stats(&self) -> Result<HubStats> {
        let (reply, rx) = oneshot::channel();
        self.submit(HubCommand::Stats { reply }).await?;
        rx.await
            .map_err(|_| Error::internal("signaling hub dropped stats request"))
    }
}

async fn run(mut hub: Hub, mut rx: mpsc::Receiver<HubCommand>) {
    info!("signaling hub started");
    while let Some(command) = rx.recv().await {
        hub.apply(command);
    }
    info!("signaling hub stopped");
}
