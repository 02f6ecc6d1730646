//! Connection registry: who is online, under which display name.

use std::collections::HashMap;

use huddle_common::{ConnectionId, RosterEntry};

/// Maps an open connection to the display name it joined with.
///
/// Owned by the hub task; nothing else reads or writes the map.
#[derive(Debug, Default)]
pub struct Registry {
    users: HashMap<ConnectionId, String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `id` as online under `display_name`, replacing any earlier
    /// name for the same id. Returns `false` (and stores nothing) when the
    /// name is empty.
    pub fn register(&mut self, id: ConnectionId, display_name: &str) -> bool {
        if display_name.is_empty() {
            return false;
        }
        self.users.insert(id, display_name.to_string());
        true
    }

    /// Drop `id`, returning the name it was registered under, if any.
    pub fn unregister(&mut self, id: &ConnectionId) -> Option<String> {
        self.users.remove(id)
    }

    /// Every registered user except `excluding`. Order is unspecified.
    pub fn snapshot(&self, excluding: &ConnectionId) -> Vec<RosterEntry> {
        self.users
            .iter()
            .filter(|(id, _)| *id != excluding)
            .map(|(id, name)| (*id, name.clone()))
            .collect()
    }

    pub fn display_name(&self, id: &ConnectionId) -> Option<&str> {
        self.users.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
