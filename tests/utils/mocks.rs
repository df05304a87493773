use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

use doubt::websockets::{ConnectionEntry, ConnectionManager};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Records every frame routed to a player instead of writing to a socket
#[derive(Clone, Default)]
pub struct MockConnectionManager {
    sent_messages: Arc<RwLock<HashMap<String, VecDeque<String>>>>,
    connections: Arc<RwLock<HashMap<String, ConnectionEntry>>>,
}

impl MockConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_messages_for(&self, player_id: &str) -> Vec<String> {
        self.sent_messages
            .read()
            .await
            .get(player_id)
            .map(|queue| queue.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Pops the oldest unread frame for a player
    pub async fn consume_message_for(&self, player_id: &str) -> Option<String> {
        self.sent_messages
            .write()
            .await
            .get_mut(player_id)
            .and_then(|queue| queue.pop_front())
    }

    pub async fn clear_messages(&self) {
        self.sent_messages.write().await.clear();
    }

    pub async fn connected_players(&self) -> Vec<String> {
        self.connections.read().await.keys().cloned().collect()
    }

    /// Whether `player_id` is currently routed to `sender`
    pub async fn is_routed_to(&self, player_id: &str, sender: &mpsc::UnboundedSender<String>) -> bool {
        self.connections
            .read()
            .await
            .get(player_id)
            .is_some_and(|entry| entry.belongs_to(sender))
    }
}

#[async_trait]
impl ConnectionManager for MockConnectionManager {
    async fn add_connection(
        &self,
        player_id: String,
        entry: ConnectionEntry,
    ) -> Option<ConnectionEntry> {
        self.connections.write().await.insert(player_id, entry)
    }

    async fn set_room(
        &self,
        player_id: &str,
        sender: &mpsc::UnboundedSender<String>,
        room_id: Option<String>,
    ) {
        if let Some(entry) = self.connections.write().await.get_mut(player_id) {
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
        if !self.connections.read().await.contains_key(player_id) {
            return;
        }
        self.sent_messages
            .write()
            .await
            .entry(player_id.to_string())
            .or_default()
            .push_back(message.to_string());
    }
}
