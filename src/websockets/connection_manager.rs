use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

/// Where a player's traffic goes: the socket's outbound channel and, once the
/// socket has been bound, the room it sits in.
#[derive(Debug, Clone)]
pub struct ConnectionEntry {
    pub sender: mpsc::UnboundedSender<String>,
    pub room_id: Option<String>,
}

impl ConnectionEntry {
    pub fn new(sender: mpsc::UnboundedSender<String>) -> Self {
        Self {
            sender,
            room_id: None,
        }
    }

    pub fn belongs_to(&self, sender: &mpsc::UnboundedSender<String>) -> bool {
        self.sender.same_channel(sender)
    }
}

/// Outbound channels by player id. A player without an entry is treated as
/// disconnected and simply skipped when messages go out.
#[async_trait]
pub trait ConnectionManager: Send + Sync {
    /// Routes `player_id` to `entry`, returning the entry it replaced
    async fn add_connection(
        &self,
        player_id: String,
        entry: ConnectionEntry,
    ) -> Option<ConnectionEntry>;

    /// Records the room of the entry for `player_id`, if `sender` still owns it
    async fn set_room(
        &self,
        player_id: &str,
        sender: &mpsc::UnboundedSender<String>,
        room_id: Option<String>,
    );

    /// Drops the entry only if it still belongs to `sender`, so a newer
    /// connection for the same player id survives an older one closing.
    /// Returns whether an entry was removed.
    async fn remove_connection(
        &self,
        player_id: &str,
        sender: &mpsc::UnboundedSender<String>,
    ) -> bool;

    async fn send_to_player(&self, player_id: &str, message: &str);
}

pub struct InMemoryConnectionManager {
    // player id -> entry
    connections: Arc<RwLock<HashMap<String, ConnectionEntry>>>,
}

impl Default for InMemoryConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl ConnectionManager for InMemoryConnectionManager {
    async fn add_connection(
        &self,
        player_id: String,
        entry: ConnectionEntry,
    ) -> Option<ConnectionEntry> {
        let mut connections = self.connections.write().await;
        connections.insert(player_id, entry)
    }

    async fn set_room(
        &self,
        player_id: &str,
        sender: &mpsc::UnboundedSender<String>,
        room_id: Option<String>,
    ) {
        let mut connections = self.connections.write().await;
        if let Some(entry) = connections.get_mut(player_id) {
            if entry.belongs_to(sender) {
                entry.room_id = room_id;
            }
        }
    }

    async fn remove_connection(
        &self,
        player_id: &str,
        sender: &mpsc::UnboundedSender<String>,
    ) -> bool {
        let mut connections = self.connections.write().await;
        match connections.get(player_id) {
            Some(existing) if existing.belongs_to(sender) => {
                connections.remove(player_id);
                true
            }
            _ => false,
        }
    }

    async fn send_to_player(&self, player_id: &str, message: &str) {
        let connections = self.connections.read().await;
        if let Some(entry) = connections.get(player_id) {
            let _ = entry.sender.send(message.to_string());
        }
    }
}
