use async_trait::async_trait;
use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

use crate::room::{registry::normalize_room_code, GameError, RoomService};
use crate::shared::AppState;
use crate::websockets::messages::{
    ChangeSettingsPayload, CreateRoomPayload, JoinRoomPayload, MessageType, PlayCardsPayload,
    WebSocketMessage,
};

use super::connection_manager::{ConnectionEntry, ConnectionManager};
use super::session::ConnectionSession;
use super::socket::{Connection, MessageHandler};

/// Message handler for receiving WebSocket messages from the client
pub struct WebsocketReceiveHandler {
    room_service: RoomService,
    connection_manager: Arc<dyn ConnectionManager>,
}

impl WebsocketReceiveHandler {
    pub fn new(room_service: RoomService, connection_manager: Arc<dyn ConnectionManager>) -> Self {
        Self {
            room_service,
            connection_manager,
        }
    }

    async fn create_room(&self, session: &mut ConnectionSession, payload: CreateRoomPayload) {
        self.leave_current_room(session).await;
        let displaced = self.register(session, &payload.player_id).await;

        let room_id = self
            .room_service
            .create_room(&payload.player_id, &payload.player_name)
            .await;
        self.take_over(session, &payload.player_id, &room_id, displaced)
            .await;
        session.bind(payload.player_id, room_id);
    }

    async fn join_room(&self, session: &mut ConnectionSession, payload: JoinRoomPayload) {
        // Rejoining the seat this socket already holds only refreshes the name
        let target = normalize_room_code(&payload.room_id);
        let rejoining = session.binding() == Some((payload.player_id.as_str(), target.as_str()));
        if !rejoining {
            self.leave_current_room(session).await;
        }
        let displaced = self.register(session, &payload.player_id).await;

        match self
            .room_service
            .join_room(&payload.room_id, &payload.player_id, &payload.player_name)
            .await
        {
            Ok(room_id) => {
                self.take_over(session, &payload.player_id, &room_id, displaced)
                    .await;
                session.bind(payload.player_id, room_id);
            }
            Err(e) => {
                if !rejoining {
                    self.unregister(session, &payload.player_id, displaced).await;
                    session.unbind();
                }
                report(session, "joinRoom", Err(e));
            }
        }
    }

    /// Routes this connection's traffic to `player_id`, dropping any
    /// registration it held under a different id. Returns the entry of
    /// another socket that was routed to `player_id` until now.
    async fn register(
        &self,
        session: &ConnectionSession,
        player_id: &str,
    ) -> Option<ConnectionEntry> {
        if let Some(previous) = session.player_id() {
            if previous != player_id {
                self.connection_manager
                    .remove_connection(previous, session.outbound())
                    .await;
            }
        }
        let replaced = self
            .connection_manager
            .add_connection(
                player_id.to_string(),
                ConnectionEntry::new(session.outbound().clone()),
            )
            .await?;

        if replaced.belongs_to(session.outbound()) {
            self.connection_manager
                .set_room(player_id, session.outbound(), replaced.room_id)
                .await;
            return None;
        }
        Some(replaced)
    }

    /// Undoes `register` after a failed join, handing the player id back to
    /// the socket it was taken from
    async fn unregister(
        &self,
        session: &ConnectionSession,
        player_id: &str,
        displaced: Option<ConnectionEntry>,
    ) {
        let removed = self
            .connection_manager
            .remove_connection(player_id, session.outbound())
            .await;
        if let (true, Some(entry)) = (removed, displaced) {
            debug!(player_id = %player_id, "Restoring connection after failed join");
            self.connection_manager
                .add_connection(player_id.to_string(), entry)
                .await;
        }
    }

    /// Completes a successful create or join. A seat the player held in a
    /// different room through the displaced socket is given up.
    async fn take_over(
        &self,
        session: &ConnectionSession,
        player_id: &str,
        room_id: &str,
        displaced: Option<ConnectionEntry>,
    ) {
        self.connection_manager
            .set_room(player_id, session.outbound(), Some(room_id.to_string()))
            .await;

        let Some(old_room) = displaced.and_then(|entry| entry.room_id) else {
            return;
        };
        if old_room != room_id {
            info!(
                player_id = %player_id,
                old_room = %old_room,
                room_id = %room_id,
                "Player moved to a new connection, leaving previous room"
            );
            if let Err(e) = self.room_service.leave_room(&old_room, player_id).await {
                debug!(
                    player_id = %player_id,
                    room_id = %old_room,
                    error = %e,
                    "Previous seat already gone"
                );
            }
        }
    }

    async fn leave_current_room(&self, session: &mut ConnectionSession) {
        if let Some((player_id, room_id)) = session.binding() {
            let result = self.room_service.leave_room(room_id, player_id).await;
            report(session, "leaveRoom", result);
            self.connection_manager
                .set_room(player_id, session.outbound(), None)
                .await;
        }
        session.leave_room();
    }

    /// Handles messages that only make sense once the connection sits in a room
    async fn handle_room_message(
        &self,
        session: &mut ConnectionSession,
        action: RoomAction,
        message: &WebSocketMessage,
    ) {
        let Some((player_id, room_id)) = session.binding() else {
            debug!(
                message_type = ?message.message_type,
                "Ignoring room message from a connection outside any room"
            );
            return;
        };
        let (player_id, room_id) = (player_id.to_string(), room_id.to_string());

        let result = match action {
            RoomAction::ChangeSettings => match message.parse_payload::<ChangeSettingsPayload>() {
                Ok(payload) => match payload.timeout_seconds() {
                    Some(seconds) => {
                        self.room_service
                            .change_settings(&room_id, &player_id, seconds)
                            .await
                    }
                    None => Err(GameError::InvalidSetting(format!(
                        "challenge timeout must be a number, got {}",
                        payload.challenge_timeout_seconds
                    ))),
                },
                Err(e) => return warn_bad_payload(&message.message_type, e),
            },
            RoomAction::StartGame => self.room_service.start_game(&room_id, &player_id).await,
            RoomAction::PlayCards => match message.parse_payload::<PlayCardsPayload>() {
                Ok(payload) => self
                    .room_service
                    .play_cards(&room_id, &player_id, &payload.card_ids)
                    .await
                    .map(|_| ()),
                Err(e) => return warn_bad_payload(&message.message_type, e),
            },
            RoomAction::Challenge => self.room_service.challenge(&room_id, &player_id).await,
            RoomAction::LeaveRoom => {
                self.leave_current_room(session).await;
                self.connection_manager
                    .remove_connection(&player_id, session.outbound())
                    .await;
                session.unbind();
                Ok(())
            }
        };

        report(session, "roomMessage", result);
    }
}

/// Inbound messages that act on the room a connection is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoomAction {
    ChangeSettings,
    StartGame,
    PlayCards,
    Challenge,
    LeaveRoom,
}

#[async_trait]
impl MessageHandler for WebsocketReceiveHandler {
    async fn handle_message(&self, session: &mut ConnectionSession, message: String) {
        trace!(
            player_id = ?session.player_id(),
            room_id = ?session.room_id(),
            message = %message,
            "Received message"
        );

        let ws_message = match serde_json::from_str::<WebSocketMessage>(&message) {
            Ok(ws_message) => ws_message,
            Err(e) => {
                warn!(
                    player_id = ?session.player_id(),
                    error = %e,
                    "Failed to parse WebSocket message"
                );
                return;
            }
        };

        match ws_message.message_type {
            MessageType::CreateRoom => match ws_message.parse_payload::<CreateRoomPayload>() {
                Ok(payload) => self.create_room(session, payload).await,
                Err(e) => warn_bad_payload(&ws_message.message_type, e),
            },
            MessageType::JoinRoom => match ws_message.parse_payload::<JoinRoomPayload>() {
                Ok(payload) => self.join_room(session, payload).await,
                Err(e) => warn_bad_payload(&ws_message.message_type, e),
            },
            MessageType::ChangeSettings => {
                self.handle_room_message(session, RoomAction::ChangeSettings, &ws_message)
                    .await
            }
            MessageType::StartGame => {
                self.handle_room_message(session, RoomAction::StartGame, &ws_message)
                    .await
            }
            MessageType::PlayCards => {
                self.handle_room_message(session, RoomAction::PlayCards, &ws_message)
                    .await
            }
            MessageType::Challenge => {
                self.handle_room_message(session, RoomAction::Challenge, &ws_message)
                    .await
            }
            MessageType::LeaveRoom => {
                self.handle_room_message(session, RoomAction::LeaveRoom, &ws_message)
                    .await
            }
            MessageType::RoomCreated
            | MessageType::JoinedRoom
            | MessageType::UpdateState
            | MessageType::Error => {
                debug!(
                    message_type = ?ws_message.message_type,
                    "Ignoring server-only message type from client"
                );
            }
        }
    }

    async fn handle_disconnect(&self, session: &ConnectionSession) {
        let Some(player_id) = session.player_id() else {
            return;
        };

        // A newer socket for the same player keeps the seat
        let removed = self
            .connection_manager
            .remove_connection(player_id, session.outbound())
            .await;
        if !removed {
            debug!(player_id = %player_id, "Connection superseded, seat kept");
            return;
        }

        if let Some(room_id) = session.room_id() {
            let result = self.room_service.leave_room(room_id, player_id).await;
            report(session, "disconnect", result);
        }
    }
}

fn warn_bad_payload(message_type: &MessageType, error: serde_json::Error) {
    warn!(message_type = ?message_type, error = %error, "Invalid message payload");
}

/// Sends user-facing errors back to the originator; everything else is only logged
fn report(session: &ConnectionSession, action: &str, result: Result<(), GameError>) {
    let Err(error) = result else {
        return;
    };

    if error.is_user_visible() {
        debug!(
            player_id = ?session.player_id(),
            action = %action,
            error = %error,
            "Rejected request"
        );
        match serde_json::to_string(&WebSocketMessage::error(error.to_string())) {
            Ok(message_json) => session.send(message_json),
            Err(e) => warn!(error = %e, "Failed to serialize error message"),
        }
    } else if error == GameError::StaleChallengeWindow {
        trace!(player_id = ?session.player_id(), action = %action, "Stale challenge window");
    } else {
        debug!(
            player_id = ?session.player_id(),
            action = %action,
            error = %error,
            "Dropped request"
        );
    }
}

/// WebSocket endpoint. Connections start anonymous and are bound to a
/// player and room by their first createRoom or joinRoom.
pub async fn websocket_handler(ws: WebSocketUpgrade, State(app_state): State<AppState>) -> Response {
    debug!("WebSocket connection requested");
    ws.on_upgrade(move |socket| handle_websocket_connection(socket, app_state))
}

/// Handle the upgraded WebSocket connection
async fn handle_websocket_connection(socket: axum::extract::ws::WebSocket, app_state: AppState) {
    info!("WebSocket connection established");

    let message_handler = Arc::new(WebsocketReceiveHandler::new(
        app_state.room_service.clone(),
        app_state.connection_manager.clone(),
    ));
    let connection = Connection::new(Box::new(socket), message_handler);

    match connection.run().await {
        Ok(()) => info!("WebSocket connection closed cleanly"),
        Err(e) => warn!(error = ?e, "WebSocket connection error"),
    }
}
