#![allow(dead_code)] // Not every test uses every action

use serde_json::json;
use tokio::time::{sleep, Duration};

use doubt::{
    game::Card,
    websockets::{MessageHandler, MessageType, WebSocketMessage},
};

use super::setup::{display_name, TestClient, TestSetup};

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Feed a raw text frame through the handler as if it came from `player`'s socket
    pub async fn send_raw(&self, player: &str, frame: &str) {
        let mut clients = self.clients.lock().await;
        let client = clients
            .entry(player.to_string())
            .or_insert_with(TestClient::new);
        self.input_handler
            .handle_message(&mut client.session, frame.to_string())
            .await;
    }

    /// Send a WebSocket message from `player`
    pub async fn send_message(&self, player: &str, message: WebSocketMessage) {
        let message_json = serde_json::to_string(&message).unwrap();
        self.send_raw(player, &message_json).await;
    }

    /// Close `player`'s socket
    pub async fn disconnect(&self, player: &str) {
        let client = self.clients.lock().await.remove(player);
        if let Some(client) = client {
            self.input_handler.handle_disconnect(&client.session).await;
        }
    }

    /// Swap in a fresh socket for `player` without closing the old one
    pub async fn open_new_socket(&self, player: &str) -> Option<TestClient> {
        self.clients
            .lock()
            .await
            .insert(player.to_string(), TestClient::new())
    }

    /// Room the player's socket is currently bound to
    pub async fn bound_room(&self, player: &str) -> Option<String> {
        let clients = self.clients.lock().await;
        clients
            .get(player)
            .and_then(|client| client.session.room_id().map(str::to_string))
    }

    /// Frames written directly to the player's socket, such as errors
    pub async fn take_direct_messages(&self, player: &str) -> Vec<WebSocketMessage> {
        let mut clients = self.clients.lock().await;
        let mut messages = vec![];
        if let Some(client) = clients.get_mut(player) {
            while let Ok(raw) = client.direct.try_recv() {
                messages.push(serde_json::from_str(&raw).unwrap());
            }
        }
        messages
    }

    /// Clear all recorded messages
    pub async fn clear_messages(&self) {
        self.mock_conn_manager.clear_messages().await;
        let mut clients = self.clients.lock().await;
        for client in clients.values_mut() {
            while client.direct.try_recv().is_ok() {}
        }
    }

    /// Let the paused clock run past a challenge window of `seconds`
    pub async fn wait_for_challenge_window(&self, seconds: u64) {
        sleep(Duration::from_secs(seconds) + Duration::from_millis(100)).await;
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    pub async fn send_create_room(&self, player: &str) {
        self.send_message(
            player,
            WebSocketMessage::new(
                MessageType::CreateRoom,
                json!({ "playerId": player, "playerName": display_name(player) }),
            ),
        )
        .await;
    }

    pub async fn send_join_room(&self, player: &str, room_id: &str) {
        self.send_message(
            player,
            WebSocketMessage::new(
                MessageType::JoinRoom,
                json!({
                    "roomId": room_id,
                    "playerId": player,
                    "playerName": display_name(player),
                }),
            ),
        )
        .await;
    }

    pub async fn send_change_settings(&self, player: &str, timeout: serde_json::Value) {
        self.send_message(
            player,
            WebSocketMessage::new(
                MessageType::ChangeSettings,
                json!({ "challengeTimeoutSeconds": timeout }),
            ),
        )
        .await;
    }

    pub async fn send_start_game(&self, player: &str) {
        self.send_message(player, WebSocketMessage::new(MessageType::StartGame, json!({})))
            .await;
    }

    pub async fn send_play_cards(&self, player: &str, card_ids: Vec<&str>) {
        self.send_message(
            player,
            WebSocketMessage::new(MessageType::PlayCards, json!({ "cardIds": card_ids })),
        )
        .await;
    }

    pub async fn send_challenge(&self, player: &str) {
        self.send_message(player, WebSocketMessage::new(MessageType::Challenge, json!({})))
            .await;
    }

    pub async fn send_leave_room(&self, player: &str) {
        self.send_message(player, WebSocketMessage::new(MessageType::LeaveRoom, json!({})))
            .await;
    }

    /// Start a game dealing `hands` exactly: the deck is interleaved so the
    /// round-robin deal hands each player their list
    pub async fn start_with_hands(&self, hands: Vec<Vec<Card>>) {
        let size = hands.first().map(Vec::len).unwrap_or(0);
        assert!(
            hands.iter().all(|hand| hand.len() == size),
            "scripted hands must be the same size"
        );
        let mut deck = vec![];
        for i in 0..size {
            for hand in &hands {
                deck.push(hand[i].clone());
            }
        }

        self.room_service
            .start_game_with_deck(&self.room_id, &self.players[0], deck)
            .await
            .expect("scripted game should start");
    }
}
