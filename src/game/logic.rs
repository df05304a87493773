// Round rules shared by every room: what counts as a lie, how the call
// cycles and who plays next. The state machine that drives these lives in
// `room::models`.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game::cards::{Card, HIGHEST_RANK, LOWEST_RANK};

/// Summary of the most recent challenge, shown to every player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResult {
    pub challenger_name: String,
    pub challenged_name: String,
    pub was_lie: bool,
    pub loser_name: String,
}

/// Public per-game state. Replaced wholesale whenever a new game starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub game_id: u64,
    /// Incremented on every accepted play; stale timers compare against it
    pub round: u64,
    pub turn_order: Vec<String>,
    pub turn_player_id: String,
    /// The player whose play is awaiting a challenge or timeout
    pub last_player_id: Option<String>,
    pub current_call: u8,
    pub field_card_count: usize,
    pub challenge_phase: bool,
    pub challenge_deadline: Option<DateTime<Utc>>,
    pub winner: Option<String>,
    pub challenge_result: Option<ChallengeResult>,
}

impl GameState {
    pub fn new(game_id: u64, turn_order: Vec<String>) -> Self {
        let turn_player_id = turn_order.first().cloned().unwrap_or_default();
        Self {
            game_id,
            round: 0,
            turn_order,
            turn_player_id,
            last_player_id: None,
            current_call: LOWEST_RANK,
            field_card_count: 0,
            challenge_phase: false,
            challenge_deadline: None,
            winner: None,
            challenge_result: None,
        }
    }

    pub fn pending_player(&self) -> Option<&str> {
        if self.challenge_phase {
            self.last_player_id.as_deref()
        } else {
            None
        }
    }

    /// Opens the challenge window for `player_id`'s play
    pub fn open_challenge(&mut self, player_id: &str, deadline: DateTime<Utc>) {
        self.last_player_id = Some(player_id.to_string());
        self.challenge_phase = true;
        self.challenge_deadline = Some(deadline);
    }

    /// Closes the challenge window. Returns the player whose play was pending,
    /// or None when the window had already been closed.
    pub fn close_challenge(&mut self) -> Option<String> {
        if !self.challenge_phase {
            return None;
        }
        self.challenge_phase = false;
        self.challenge_deadline = None;
        self.last_player_id.take()
    }

    /// Moves the turn to whoever follows `after` and cycles the call.
    /// Ends every round, however it was resolved.
    pub fn finish_round(&mut self, after: &str) {
        if let Some(next) = next_in_order(&self.turn_order, after) {
            self.turn_player_id = next;
        }
        self.current_call = next_call(self.current_call);
    }
}

/// Server-only card bookkeeping. Never serialised to clients.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrivateState {
    pub field_cards: Vec<Card>,
    pub last_played_cards: Vec<Card>,
}

impl PrivateState {
    pub fn reset(&mut self) {
        self.field_cards.clear();
        self.last_played_cards.clear();
    }
}

/// A play is a lie when any non-joker card in it differs from the call
pub fn was_lie(played: &[Card], call: u8) -> bool {
    played.iter().any(|card| !card.matches_call(call))
}

/// The call after `call`, wrapping from the highest rank back to the lowest
pub fn next_call(call: u8) -> u8 {
    (call % HIGHEST_RANK) + LOWEST_RANK
}

/// The id that follows `current` in `order`, wrapping around. None if
/// `current` is not seated.
pub fn next_in_order(order: &[String], current: &str) -> Option<String> {
    let index = order.iter().position(|id| id == current)?;
    order.get((index + 1) % order.len()).cloned()
}
