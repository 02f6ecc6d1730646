//! Presence fan-out: turns registry changes into `user-joined`,
//! `active-users` and `user-left` events.

use huddle_common::{ConnectionId, Presence, ServerEvent};
use tracing::{debug, info};

use crate::registry::Registry;
use crate::transport::Transport;

/// Register `id` under `username` and tell everyone about it.
///
/// Every other open connection gets `user-joined`; the joiner alone gets
/// `active-users` with the roster minus itself. Returns `false` without
/// sending anything when the name is empty.
pub fn announce_join<T: Transport + ?Sized>(
    registry: &mut Registry,
    transport: &T,
    id: ConnectionId,
    username: &str,
) -> bool {
    if !registry.register(id, username) {
        debug!(%id, "join without a username ignored");
        return false;
    }

    let joined = ServerEvent::UserJoined(Presence {
        id,
        username: Some(username.to_string()),
    });
    let notified = transport.broadcast_except(Some(&id), &joined);

    let roster = registry.snapshot(&id);
    let roster_len = roster.len();
    transport.send_to(&id, &ServerEvent::ActiveUsers(roster));

    info!(%id, username, notified, roster = roster_len, "user joined");
    true
}

/// Evict `id` and broadcast `user-left` to every connection still open.
///
/// Runs for every disconnect, joined or not; `username` is left out of the
/// payload when `id` never joined. The caller detaches `id` from the
/// transport first so the departing socket is not addressed.
pub fn announce_leave<T: Transport + ?Sized>(
    registry: &mut Registry,
    transport: &T,
    id: ConnectionId,
) -> Option<String> {
    let username = registry.unregister(&id);
    let left = ServerEvent::UserLeft(Presence {
        id,
        username: username.clone(),
    });
    let notified = transport.broadcast_except(None, &left);

    info!(%id, username = ?username, notified, "user left");
    username
}
