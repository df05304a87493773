use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::room::projection::StateView;

/// Message types for WebSocket communication
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum MessageType {
    // Client -> Server
    CreateRoom,
    JoinRoom,
    ChangeSettings,
    StartGame,
    PlayCards,
    Challenge,
    LeaveRoom,

    // Server -> Client
    RoomCreated,
    JoinedRoom,
    UpdateState,
    Error,
}

/// Envelope for every frame in either direction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Client-to-Server message payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomPayload {
    pub player_id: String,
    pub player_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomPayload {
    pub room_id: String,
    pub player_id: String,
    pub player_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSettingsPayload {
    /// Browsers send select values as strings, so both forms are accepted
    pub challenge_timeout_seconds: serde_json::Value,
}

impl ChangeSettingsPayload {
    pub fn timeout_seconds(&self) -> Option<u64> {
        match &self.challenge_timeout_seconds {
            serde_json::Value::Number(n) => n.as_u64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayCardsPayload {
    pub card_ids: Vec<String>,
}

/// Server-to-Client message payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomJoinedPayload {
    pub room_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}

/// Helper functions for creating and reading messages
impl WebSocketMessage {
    pub fn new(message_type: MessageType, payload: serde_json::Value) -> Self {
        Self {
            message_type,
            payload,
        }
    }

    /// Decode the payload into its typed form. A missing payload reads as `{}`.
    pub fn parse_payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        if self.payload.is_null() {
            serde_json::from_value(serde_json::json!({}))
        } else {
            T::deserialize(&self.payload)
        }
    }

    /// Create a roomCreated message
    pub fn room_created(room_id: String) -> Self {
        let payload = RoomJoinedPayload { room_id };
        Self::new(
            MessageType::RoomCreated,
            serde_json::to_value(payload).unwrap_or_default(),
        )
    }

    /// Create a joinedRoom message
    pub fn joined_room(room_id: String) -> Self {
        let payload = RoomJoinedPayload { room_id };
        Self::new(
            MessageType::JoinedRoom,
            serde_json::to_value(payload).unwrap_or_default(),
        )
    }

    /// Create an updateState message carrying one player's view
    pub fn update_state(view: &StateView) -> Self {
        Self::new(
            MessageType::UpdateState,
            serde_json::to_value(view).unwrap_or_default(),
        )
    }

    /// Create an error message
    pub fn error(message: String) -> Self {
        let payload = ErrorPayload { message };
        Self::new(
            MessageType::Error,
            serde_json::to_value(payload).unwrap_or_default(),
        )
    }
}
