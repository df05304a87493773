//! Test assertion helpers - fluent API for verifying test expectations
#![allow(dead_code)] // Test utilities may not all be used in every test

use doubt::websockets::{MessageType, WebSocketMessage};

use super::setup::TestSetup;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct MessageAssertion<'a> {
    setup: &'a TestSetup,
    players: Vec<&'a str>,
}

impl<'a> MessageAssertion<'a> {
    /// Create an assertion for all players in the setup
    pub fn for_all_players(setup: &'a TestSetup) -> Self {
        let players = setup.players.iter().map(String::as_str).collect();
        Self { setup, players }
    }

    /// Create an assertion for specific players
    pub fn for_players(setup: &'a TestSetup, players: Vec<&'a str>) -> Self {
        Self { setup, players }
    }

    pub fn for_player(setup: &'a TestSetup, player: &'a str) -> Self {
        Self::for_players(setup, vec![player])
    }

    /// Assert that each player's next routed frame has the given type
    /// (consumes it). Returns every player's payload, in player order.
    pub async fn received_message_type(self, expected_type: MessageType) -> Vec<MessageContent> {
        let mut contents = vec![];

        for player in &self.players {
            let message = self
                .setup
                .mock_conn_manager
                .consume_message_for(player)
                .await;
            assert!(
                message.is_some(),
                "{} should have received a {:?} message",
                player,
                expected_type
            );

            let msg: WebSocketMessage = serde_json::from_str(&message.unwrap()).unwrap();
            assert_eq!(
                msg.message_type, expected_type,
                "{} received wrong message type",
                player
            );
            contents.push(MessageContent {
                player: player.to_string(),
                payload: msg.payload,
            });
        }

        contents
    }

    /// Consume one updateState per player and check the shared parts agree
    pub async fn received_state_update(self) -> Vec<MessageContent> {
        let contents = self.received_message_type(MessageType::UpdateState).await;
        if let Some((first, rest)) = contents.split_first() {
            for other in rest {
                for field in ["roomId", "status", "settings", "players", "gameState", "creatorId"] {
                    assert_eq!(
                        other.payload[field], first.payload[field],
                        "{} and {} disagree on {}",
                        other.player, first.player, field
                    );
                }
            }
        }
        contents
    }

    /// Assert that players received no routed messages
    pub async fn received_no_messages(self) {
        for player in &self.players {
            let messages = self.setup.mock_conn_manager.get_messages_for(player).await;
            assert!(
                messages.is_empty(),
                "{} should not have received any messages, got {:?}",
                player,
                messages
            );
        }
    }

    /// Assert each player got exactly one error, written straight to their socket
    pub async fn received_error(self, expected_fragment: &str) {
        for player in &self.players {
            let direct = self.setup.take_direct_messages(player).await;
            assert_eq!(direct.len(), 1, "{} should have received one error", player);
            assert_eq!(direct[0].message_type, MessageType::Error);
            let message = direct[0].payload["message"].as_str().unwrap_or_default();
            assert!(
                message.contains(expected_fragment),
                "{} error {:?} should mention {:?}",
                player,
                message,
                expected_fragment
            );
        }
    }

    /// Assert nothing was written straight to the players' sockets
    pub async fn received_no_errors(self) {
        for player in &self.players {
            let direct = self.setup.take_direct_messages(player).await;
            assert!(direct.is_empty(), "{} got unexpected frames {:?}", player, direct);
        }
    }
}

// ============================================================================
// Message Content Assertions
// ============================================================================

pub struct MessageContent {
    pub player: String,
    pub payload: serde_json::Value,
}

impl MessageContent {
    pub fn game(&self) -> &serde_json::Value {
        &self.payload["gameState"]
    }

    pub fn with_room_id(self, room_id: &str) -> Self {
        assert_eq!(self.payload["roomId"], room_id);
        self
    }

    pub fn with_status(self, status: &str) -> Self {
        assert_eq!(self.payload["status"], status);
        self
    }

    pub fn with_creator(self, creator_id: &str) -> Self {
        assert_eq!(self.payload["creatorId"], creator_id);
        self
    }

    pub fn with_player_count(self, count: usize) -> Self {
        let players = self.payload["players"].as_object().unwrap();
        assert_eq!(players.len(), count);
        self
    }

    pub fn with_player_name(self, player_id: &str, name: &str) -> Self {
        assert_eq!(self.payload["players"][player_id]["name"], name);
        self
    }

    pub fn with_card_count(self, player_id: &str, count: usize) -> Self {
        assert_eq!(
            self.payload["players"][player_id]["cardCount"], count,
            "card count of {} as seen by {}",
            player_id, self.player
        );
        self
    }

    pub fn with_challenge_timeout(self, seconds: u64) -> Self {
        assert_eq!(self.payload["settings"]["challengeTimeoutSeconds"], seconds);
        self
    }

    /// Assert the viewer's own hand, by card id and in order
    pub fn with_hand(self, card_ids: Vec<&str>) -> Self {
        let hand: Vec<&str> = self.payload["myHand"]
            .as_array()
            .unwrap()
            .iter()
            .map(|card| card["id"].as_str().unwrap())
            .collect();
        assert_eq!(hand, card_ids, "hand of {}", self.player);
        self
    }

    pub fn with_hand_size(self, size: usize) -> Self {
        assert_eq!(self.payload["myHand"].as_array().unwrap().len(), size);
        self
    }

    pub fn with_turn(self, player_id: &str) -> Self {
        assert_eq!(self.game()["turnPlayerId"], player_id);
        self
    }

    pub fn with_current_call(self, call: u8) -> Self {
        assert_eq!(self.game()["currentCall"], call);
        self
    }

    pub fn with_field_count(self, count: usize) -> Self {
        assert_eq!(self.game()["fieldCardCount"], count);
        self
    }

    /// Assert an open challenge window against `player_id`'s play
    pub fn with_challenge_open_for(self, player_id: &str) -> Self {
        assert_eq!(self.game()["challengePhase"], true);
        assert_eq!(self.game()["lastPlayerId"], player_id);
        assert!(self.game()["challengeDeadline"].is_string());
        self
    }

    pub fn with_challenge_closed(self) -> Self {
        assert_eq!(self.game()["challengePhase"], false);
        assert!(self.game()["lastPlayerId"].is_null());
        self
    }

    pub fn with_challenge_result(self, challenger: &str, challenged: &str, was_lie: bool, loser: &str) -> Self {
        let result = &self.game()["challengeResult"];
        assert_eq!(result["challengerName"], challenger);
        assert_eq!(result["challengedName"], challenged);
        assert_eq!(result["wasLie"], was_lie);
        assert_eq!(result["loserName"], loser);
        self
    }

    pub fn without_challenge_result(self) -> Self {
        assert!(self.game()["challengeResult"].is_null());
        self
    }

    pub fn with_winner(self, player_id: &str) -> Self {
        assert_eq!(self.game()["winner"], player_id);
        self
    }

    pub fn with_turn_order(self, order: Vec<&str>) -> Self {
        let actual: Vec<&str> = self.game()["turnOrder"]
            .as_array()
            .unwrap()
            .iter()
            .map(|id| id.as_str().unwrap())
            .collect();
        assert_eq!(actual, order);
        self
    }
}
