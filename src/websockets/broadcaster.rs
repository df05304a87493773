use std::sync::Arc;
use tracing::{debug, warn};

use crate::{
    room::{models::Room, projection::project_all},
    websockets::{connection_manager::ConnectionManager, messages::WebSocketMessage},
};

/// An `updateState` frame already rendered for one recipient
#[derive(Debug, Clone)]
pub struct RenderedUpdate {
    pub player_id: String,
    pub message_json: String,
}

/// Delivers room state to the players seated in it. Rendering happens while
/// the room is locked; delivery happens after the lock is released.
#[derive(Clone)]
pub struct StateBroadcaster {
    connection_manager: Arc<dyn ConnectionManager>,
}

impl StateBroadcaster {
    pub fn new(connection_manager: Arc<dyn ConnectionManager>) -> Self {
        Self { connection_manager }
    }

    /// Projects the room once per seated player
    pub fn render(room: &Room) -> Vec<RenderedUpdate> {
        project_all(room)
            .into_iter()
            .filter_map(|(player_id, view)| {
                match serde_json::to_string(&WebSocketMessage::update_state(&view)) {
                    Ok(message_json) => Some(RenderedUpdate {
                        player_id,
                        message_json,
                    }),
                    Err(e) => {
                        warn!(
                            room_id = %room.id,
                            player_id = %player_id,
                            error = %e,
                            "Failed to serialize state update"
                        );
                        None
                    }
                }
            })
            .collect()
    }

    pub async fn deliver(&self, updates: Vec<RenderedUpdate>) {
        debug!(recipients = updates.len(), "Delivering state updates");
        for update in updates {
            self.connection_manager
                .send_to_player(&update.player_id, &update.message_json)
                .await;
        }
    }

    pub async fn send_to(&self, player_id: &str, message: &WebSocketMessage) {
        match serde_json::to_string(message) {
            Ok(message_json) => {
                self.connection_manager
                    .send_to_player(player_id, &message_json)
                    .await
            }
            Err(e) => warn!(player_id = %player_id, error = %e, "Failed to serialize message"),
        }
    }
}
