//! Signaling events exchanged over the gateway WebSocket.
//!
//! Every frame is a JSON text message of the form
//! `{"type": "<event-name>", "payload": <payload>}`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{Error, Result};

/// Opaque identifier the gateway assigns to each WebSocket connection.
///
/// A fresh id is generated for every connection and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for ConnectionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|err| Error::protocol(format!("invalid connection id {s:?}: {err}")))
    }
}

/// `call-user` payload: `caller_id` invites `callee_id`.
///
/// Only `callee_id` is needed to route the invitation; `caller_id` and
/// `username` are echoed to the callee as sent, absent or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller_id: Option<String>,
    pub callee_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// `accept-call` payload: `callee_id` answers `caller_id`.
///
/// Routed by `caller_id`; `callee_id` is echoed back as sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptCall {
    pub caller_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callee_id: Option<String>,
}

/// Events a browser client sends to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// Announce presence under a display name. An empty name means the
    /// client sent nothing usable and the join is dropped.
    Join { username: String },
    CallUser(CallUser),
    AcceptCall(AcceptCall),
}

#[derive(Debug, Deserialize)]
struct InboundFrame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Value,
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::Join { .. } => "join",
            ClientEvent::CallUser(_) => "call-user",
            ClientEvent::AcceptCall(_) => "accept-call",
        }
    }

    /// Parse one inbound text frame.
    pub fn decode(text: &str) -> Result<Self> {
        let frame: InboundFrame = serde_json::from_str(text)?;
        match frame.kind.as_str() {
            "join" => Ok(ClientEvent::Join {
                username: display_name_from(frame.payload),
            }),
            "call-user" => Ok(ClientEvent::CallUser(serde_json::from_value(frame.payload)?)),
            "accept-call" => Ok(ClientEvent::AcceptCall(serde_json::from_value(
                frame.payload,
            )?)),
            other => Err(Error::protocol(format!("unknown event type {other:?}"))),
        }
    }

    pub fn encode(&self) -> Result<String> {
        let payload = match self {
            ClientEvent::Join { username } => Value::String(username.clone()),
            ClientEvent::CallUser(call) => serde_json::to_value(call)?,
            ClientEvent::AcceptCall(accept) => serde_json::to_value(accept)?,
        };
        Ok(json!({ "type": self.name(), "payload": payload }).to_string())
    }
}

/// Falsy payloads (missing, null, false, 0, "") become an empty name.
/// Other scalars are kept as their JSON text; objects and arrays are dropped.
fn display_name_from(payload: Value) -> String {
    match payload {
        Value::String(name) => name,
        Value::Bool(true) => "true".to_string(),
        Value::Number(n) if n.as_f64() != Some(0.0) => n.to_string(),
        _ => String::new(),
    }
}

/// `user-joined` / `user-left` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presence {
    pub id: ConnectionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// One `[id, username]` pair of the `active-users` roster.
pub type RosterEntry = (ConnectionId, String);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallAccepted {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callee_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Welcome {
    pub id: ConnectionId,
}

/// Events the gateway sends to browser clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// First frame on every connection; tells the client its own id.
    Welcome(Welcome),
    UserJoined(Presence),
    ActiveUsers(Vec<RosterEntry>),
    IncomingCall(IncomingCall),
    CallAccepted(CallAccepted),
    UserLeft(Presence),
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Welcome(_) => "welcome",
            ServerEvent::UserJoined(_) => "user-joined",
            ServerEvent::ActiveUsers(_) => "active-users",
            ServerEvent::IncomingCall(_) => "incoming-call",
            ServerEvent::CallAccepted(_) => "call-accepted",
            ServerEvent::UserLeft(_) => "user-left",
        }
    }

    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_round_trips_through_display() {
        let id = ConnectionId::generate();
        let parsed: ConnectionId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_connection_id_rejects_garbage() {
        assert!("not-an-id".parse::<ConnectionId>().is_err());
        assert!("".parse::<ConnectionId>().is_err());
    }

    #[test]
    fn test_connection_ids_are_unique() {
        assert_ne!(ConnectionId::generate(), ConnectionId::generate());
    }

    #[test]
    fn test_decode_join_with_name() {
        let event = ClientEvent::decode(r#"{"type":"join","payload":"alice"}"#).unwrap();
        assert_eq!(
            event,
            ClientEvent::Join {
                username: "alice".to_string()
            }
        );
    }

    #[test]
    fn test_decode_join_falsy_payloads_yield_empty_name() {
        for text in [
            r#"{"type":"join"}"#,
            r#"{"type":"join","payload":null}"#,
            r#"{"type":"join","payload":""}"#,
            r#"{"type":"join","payload":false}"#,
            r#"{"type":"join","payload":0}"#,
            r#"{"type":"join","payload":{"username":"x"}}"#,
        ] {
            let event = ClientEvent::decode(text).unwrap();
            assert_eq!(
                event,
                ClientEvent::Join {
                    username: String::new()
                },
                "payload {text}"
            );
        }
    }

    #[test]
    fn test_decode_join_numeric_name() {
        let event = ClientEvent::decode(r#"{"type":"join","payload":42}"#).unwrap();
        assert_eq!(
            event,
            ClientEvent::Join {
                username: "42".to_string()
            }
        );
    }

    #[test]
    fn test_decode_call_user() {
        let text = r#"{"type":"call-user","payload":{"callerId":"a","calleeId":"b","username":"alice"}}"#;
        let event = ClientEvent::decode(text).unwrap();
        assert_eq!(
            event,
            ClientEvent::CallUser(CallUser {
                caller_id: Some("a".into()),
                callee_id: "b".into(),
                username: Some("alice".into()),
            })
        );
    }

    #[test]
    fn test_decode_call_user_without_username() {
        let text = r#"{"type":"call-user","payload":{"callerId":"a","calleeId":"b"}}"#;
        match ClientEvent::decode(text).unwrap() {
            ClientEvent::CallUser(call) => assert!(call.username.is_none()),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_decode_accept_call() {
        let text = r#"{"type":"accept-call","payload":{"callerId":"a","calleeId":"b"}}"#;
        let event = ClientEvent::decode(text).unwrap();
        assert_eq!(
            event,
            ClientEvent::AcceptCall(AcceptCall {
                caller_id: "a".into(),
                callee_id: Some("b".into()),
            })
        );
    }

    #[test]
    fn test_decode_rejects_unknown_and_malformed() {
        assert!(matches!(
            ClientEvent::decode(r#"{"type":"hang-up","payload":{}}"#),
            Err(Error::Protocol(_))
        ));
        assert!(matches!(
            ClientEvent::decode(r#"{"type":"accept-call","payload":{"calleeId":"b"}}"#),
            Err(Error::Serialization(_))
        ));
        assert!(matches!(
            ClientEvent::decode(r#"{"type":"call-user","payload":{"callerId":"a"}}"#),
            Err(Error::Serialization(_))
        ));
        assert!(matches!(
            ClientEvent::decode("not json"),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn test_decode_keeps_events_missing_echoed_ids() {
        let text = r#"{"type":"call-user","payload":{"calleeId":"b","username":"alice"}}"#;
        assert_eq!(
            ClientEvent::decode(text).unwrap(),
            ClientEvent::CallUser(CallUser {
                caller_id: None,
                callee_id: "b".into(),
                username: Some("alice".into()),
            })
        );

        let text = r#"{"type":"accept-call","payload":{"callerId":"a"}}"#;
        assert_eq!(
            ClientEvent::decode(text).unwrap(),
            ClientEvent::AcceptCall(AcceptCall {
                caller_id: "a".into(),
                callee_id: None,
            })
        );
    }

    #[test]
    fn test_client_encode_is_decodable() {
        let event = ClientEvent::CallUser(CallUser {
            caller_id: Some("a".into()),
            callee_id: "b".into(),
            username: None,
        });
        let text = event.encode().unwrap();
        assert!(!text.contains("username"));
        assert_eq!(ClientEvent::decode(&text).unwrap(), event);
    }

    #[test]
    fn test_active_users_wire_shape() {
        let id = ConnectionId::generate();
        let event = ServerEvent::ActiveUsers(vec![(id, "alice".to_string())]);
        let value: Value = serde_json::from_str(&event.encode().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({ "type": "active-users", "payload": [[id.to_string(), "alice"]] })
        );
    }

    #[test]
    fn test_user_left_omits_unknown_username() {
        let id = ConnectionId::generate();
        let event = ServerEvent::UserLeft(Presence { id, username: None });
        let value: Value = serde_json::from_str(&event.encode().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({ "type": "user-left", "payload": { "id": id.to_string() } })
        );
    }

    #[test]
    fn test_incoming_call_uses_camel_case() {
        let event = ServerEvent::IncomingCall(IncomingCall {
            caller_id: Some("abc".into()),
            username: Some("alice".into()),
        });
        let value: Value = serde_json::from_str(&event.encode().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({ "type": "incoming-call", "payload": { "callerId": "abc", "username": "alice" } })
        );
        assert_eq!(event.name(), "incoming-call");
    }

    #[test]
    fn test_call_accepted_omits_missing_callee() {
        let event = ServerEvent::CallAccepted(CallAccepted { callee_id: None });
        let value: Value = serde_json::from_str(&event.encode().unwrap()).unwrap();
        assert_eq!(value, json!({ "type": "call-accepted", "payload": {} }));
        assert_eq!(ServerEvent::decode(&event.encode().unwrap()).unwrap(), event);
    }
}
