use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument};

use super::models::{Room, Settings};

pub const ROOM_CODE_LENGTH: usize = 6;
const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A room behind its own lock. Holding the lock is the only way to mutate it.
pub type SharedRoom = Arc<Mutex<Room>>;

/// Room codes are typed by people, so lookups ignore case and stray spaces
pub fn normalize_room_code(code: &str) -> String {
    code.trim().to_uppercase()
}

fn generate_room_code() -> String {
    let mut rng = rand::rng();
    (0..ROOM_CODE_LENGTH)
        .map(|_| ROOM_CODE_ALPHABET[rng.random_range(0..ROOM_CODE_ALPHABET.len())] as char)
        .collect()
}

/// Live rooms by code. The map lock is only held to look up, insert or
/// remove a room, never across a room transition.
pub struct RoomRegistry {
    rooms: RwLock<HashMap<String, SharedRoom>>,
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a waiting room under a code no live room is using
    #[instrument(skip(self, settings))]
    pub async fn create(
        &self,
        creator_id: &str,
        creator_name: &str,
        settings: Settings,
        max_players: usize,
    ) -> (String, SharedRoom) {
        let mut rooms = self.rooms.write().await;

        let mut room_id = generate_room_code();
        while rooms.contains_key(&room_id) {
            debug!(room_id = %room_id, "Room code collision, regenerating");
            room_id = generate_room_code();
        }

        let room = Arc::new(Mutex::new(Room::new(
            room_id.clone(),
            creator_id.to_string(),
            creator_name.to_string(),
            settings,
            max_players,
        )));
        rooms.insert(room_id.clone(), room.clone());

        info!(room_id = %room_id, live_rooms = rooms.len(), "Room registered");
        (room_id, room)
    }

    pub async fn get(&self, room_id: &str) -> Option<SharedRoom> {
        let rooms = self.rooms.read().await;
        rooms.get(&normalize_room_code(room_id)).cloned()
    }

    pub async fn remove(&self, room_id: &str) -> Option<SharedRoom> {
        let mut rooms = self.rooms.write().await;
        let removed = rooms.remove(&normalize_room_code(room_id));
        if removed.is_some() {
            info!(room_id = %room_id, live_rooms = rooms.len(), "Room removed");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rooms.read().await.is_empty()
    }
}
