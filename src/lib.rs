// Library crate for the Doubt game server
// This file exposes the public API for integration tests

pub mod config;
pub mod game;
pub mod room;
pub mod shared;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use config::{ConfigError, GameConfig, ServerConfig};
pub use game::{Card, Suit};
pub use room::{GameError, Room, RoomRegistry, RoomService, RoomStatus, RoundTag};
pub use shared::{build_router, AppState};
pub use websockets::{
    ConnectionEntry, ConnectionManager, ConnectionSession, InMemoryConnectionManager,
    MessageHandler, MessageType, WebSocketMessage, WebsocketReceiveHandler,
};
