// Public API
pub use broadcaster::StateBroadcaster;
pub use connection_manager::{ConnectionEntry, ConnectionManager, InMemoryConnectionManager};
pub use handler::{websocket_handler, WebsocketReceiveHandler};
pub use messages::{MessageType, WebSocketMessage};
pub use session::ConnectionSession;
pub use socket::{Connection, MessageHandler, SocketError, SocketWrapper};

pub mod broadcaster;
pub mod connection_manager;
mod handler;
pub mod messages;
pub mod session;
mod socket;
