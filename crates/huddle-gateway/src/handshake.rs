//! Two-step call handshake relay.
//!
//! `call-user` becomes `incoming-call` for the callee and `accept-call`
//! becomes `call-accepted` for the caller. No call state is kept here;
//! a call the callee never accepts simply produces no second message, and
//! the caller's client owns its ringing timeout.

use huddle_common::{AcceptCall, CallAccepted, CallUser, ConnectionId, IncomingCall, ServerEvent};
use tracing::debug;

use crate::transport::Transport;

/// Forward an invitation to `call.callee_id`. Unknown or malformed ids
/// are dropped without telling the caller.
pub fn relay_invite<T: Transport + ?Sized>(transport: &T, call: CallUser) -> bool {
    let Some(callee) = resolve(&call.callee_id) else {
        return false;
    };
    let event = ServerEvent::IncomingCall(IncomingCall {
        caller_id: call.caller_id,
        username: call.username,
    });
    let delivered = transport.send_to(&callee, &event);
    debug!(%callee, delivered, "relayed incoming-call");
    delivered
}

/// Forward an acceptance back to `accept.caller_id`. Same drop policy as
/// [`relay_invite`].
pub fn relay_accept<T: Transport + ?Sized>(transport: &T, accept: AcceptCall) -> bool {
    let Some(caller) = resolve(&accept.caller_id) else {
        return false;
    };
    let event = ServerEvent::CallAccepted(CallAccepted {
        callee_id: accept.callee_id,
    });
    let delivered = transport.send_to(&caller, &event);
    debug!(%caller, delivered, "relayed call-accepted");
    delivered
}

fn resolve(raw: &str) -> Option<ConnectionId> {
    match raw.parse() {
        Ok(id) => Some(id),
        Err(err) => {
            debug!("dropping call event: {}", err);
            None
        }
    }
}
