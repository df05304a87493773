use tokio::sync::mpsc;

/// Per-connection state. A connection starts unbound and becomes bound to a
/// player and room once a create or join succeeds.
#[derive(Debug, Clone)]
pub struct ConnectionSession {
    outbound: mpsc::UnboundedSender<String>,
    player_id: Option<String>,
    room_id: Option<String>,
}

impl ConnectionSession {
    pub fn new(outbound: mpsc::UnboundedSender<String>) -> Self {
        Self {
            outbound,
            player_id: None,
            room_id: None,
        }
    }

    /// Sender feeding this connection's socket
    pub fn outbound(&self) -> &mpsc::UnboundedSender<String> {
        &self.outbound
    }

    pub fn player_id(&self) -> Option<&str> {
        self.player_id.as_deref()
    }

    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }

    /// Player and room together, only when both are set
    pub fn binding(&self) -> Option<(&str, &str)> {
        Some((self.player_id.as_deref()?, self.room_id.as_deref()?))
    }

    pub fn bind(&mut self, player_id: String, room_id: String) {
        self.player_id = Some(player_id);
        self.room_id = Some(room_id);
    }

    /// Forgets the room but keeps the player id for the connection bookkeeping
    pub fn leave_room(&mut self) {
        self.room_id = None;
    }

    pub fn unbind(&mut self) {
        self.player_id = None;
        self.room_id = None;
    }

    /// Writes straight to this connection, bypassing the connection registry
    pub fn send(&self, message: String) {
        let _ = self.outbound.send(message);
    }
}
