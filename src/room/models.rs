use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

use super::errors::GameError;
use super::timer::RoundTag;
use crate::config::DEFAULT_CHALLENGE_SECONDS;
use crate::game::{next_in_order, was_lie, Card, ChallengeResult, GameState, PrivateState};

/// Challenge window lengths a creator may choose from, in seconds
pub const ALLOWED_CHALLENGE_TIMEOUTS: [u64; 4] = [3, 5, 7, 10];

/// Most cards a single play may contain
pub const MAX_CARDS_PER_PLAY: usize = 4;

pub const MIN_PLAYERS_TO_START: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Waiting,
    Playing,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub challenge_timeout_seconds: u64,
}

impl Settings {
    pub fn new(challenge_timeout_seconds: u64) -> Result<Self, GameError> {
        if !ALLOWED_CHALLENGE_TIMEOUTS.contains(&challenge_timeout_seconds) {
            return Err(GameError::InvalidSetting(format!(
                "challenge timeout must be one of {:?} seconds, got {}",
                ALLOWED_CHALLENGE_TIMEOUTS, challenge_timeout_seconds
            )));
        }
        Ok(Self {
            challenge_timeout_seconds,
        })
    }

    pub fn challenge_timeout(&self) -> Duration {
        Duration::from_secs(self.challenge_timeout_seconds)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            challenge_timeout_seconds: DEFAULT_CHALLENGE_SECONDS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub hand: Vec<Card>,
}

impl Player {
    pub fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            hand: vec![],
        }
    }
}

/// What an accepted play led to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    /// The player emptied their hand and won; no challenge window opens
    Won,
    /// A challenge window is open; the timer for it must carry this tag
    ChallengeOpened { tag: RoundTag, timeout: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    Left,
    /// The last player left; the room must be dropped from the registry
    RoomEmpty,
}

/// One game session. Every mutation goes through a method here and is
/// validated against the current status before anything changes.
#[derive(Debug, Clone)]
pub struct Room {
    pub id: String,
    pub creator_id: String,
    pub status: RoomStatus,
    pub settings: Settings,
    pub game_state: Option<GameState>,
    players: Vec<Player>, // Registration order, which is also the dealing order
    private_state: PrivateState,
    max_players: usize,
    games_started: u64,
    dealt_cards: usize,
    closed: bool,
}

impl Room {
    pub fn new(
        id: String,
        creator_id: String,
        creator_name: String,
        settings: Settings,
        max_players: usize,
    ) -> Self {
        Self {
            id,
            creator_id: creator_id.clone(),
            status: RoomStatus::Waiting,
            settings,
            game_state: None,
            players: vec![Player::new(creator_id, creator_name)],
            private_state: PrivateState::default(),
            max_players,
            games_started: 0,
            dealt_cards: 0,
            closed: false,
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn has_player(&self, player_id: &str) -> bool {
        self.player(player_id).is_some()
    }

    pub fn player_ids(&self) -> Vec<String> {
        self.players.iter().map(|p| p.id.clone()).collect()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.max_players
    }

    /// A closed room has lost its last player and is on its way out of the registry
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of cards dealt at the start of the current game
    pub fn dealt_cards(&self) -> usize {
        self.dealt_cards
    }

    /// Cards currently held or on the field. Equals `dealt_cards` once a game has started.
    pub fn cards_in_play(&self) -> usize {
        self.players.iter().map(|p| p.hand.len()).sum::<usize>()
            + self.private_state.field_cards.len()
    }

    pub(crate) fn private_state(&self) -> &PrivateState {
        &self.private_state
    }

    pub fn add_player(&mut self, player_id: &str, player_name: &str) -> Result<(), GameError> {
        if self.closed {
            return Err(GameError::RoomNotFound);
        }

        if let Some(existing) = self.players.iter_mut().find(|p| p.id == player_id) {
            if self.status != RoomStatus::Waiting {
                return Err(GameError::GameAlreadyStarted);
            }
            existing.name = player_name.to_string();
            return Ok(());
        }

        if self.is_full() {
            return Err(GameError::RoomFull);
        }
        if self.status != RoomStatus::Waiting {
            return Err(GameError::GameAlreadyStarted);
        }

        self.players
            .push(Player::new(player_id.to_string(), player_name.to_string()));
        Ok(())
    }

    pub fn change_settings(
        &mut self,
        player_id: &str,
        challenge_timeout_seconds: u64,
    ) -> Result<(), GameError> {
        if player_id != self.creator_id || self.status != RoomStatus::Waiting {
            return Err(GameError::Unauthorized);
        }
        self.settings = Settings::new(challenge_timeout_seconds)?;
        Ok(())
    }

    /// Deals `deck` round-robin from the first registered player and starts a
    /// fresh game. The deck is dealt in the order given; shuffling is the caller's job.
    pub fn start_game(&mut self, player_id: &str, deck: Vec<Card>) -> Result<(), GameError> {
        if player_id != self.creator_id {
            return Err(GameError::Unauthorized);
        }
        if self.status == RoomStatus::Playing {
            return Err(GameError::GameAlreadyStarted);
        }
        if self.players.len() < MIN_PLAYERS_TO_START {
            return Err(GameError::NotEnoughPlayers);
        }

        for player in self.players.iter_mut() {
            player.hand.clear();
        }
        self.dealt_cards = deck.len();
        let seats = self.players.len();
        for (index, card) in deck.into_iter().enumerate() {
            self.players[index % seats].hand.push(card);
        }
        for player in self.players.iter_mut() {
            player.hand.sort();
        }

        self.games_started += 1;
        self.game_state = Some(GameState::new(self.games_started, self.player_ids()));
        self.private_state.reset();
        self.status = RoomStatus::Playing;
        Ok(())
    }

    pub fn play_cards(
        &mut self,
        player_id: &str,
        card_ids: &[String],
        now: DateTime<Utc>,
    ) -> Result<PlayOutcome, GameError> {
        if self.status != RoomStatus::Playing {
            return Err(GameError::illegal("no game in progress"));
        }
        let game = self
            .game_state
            .as_mut()
            .ok_or_else(|| GameError::illegal("no game in progress"))?;
        if game.turn_player_id != player_id {
            return Err(GameError::illegal("not this player's turn"));
        }
        if game.challenge_phase {
            return Err(GameError::illegal("a challenge is pending"));
        }
        if card_ids.is_empty() || card_ids.len() > MAX_CARDS_PER_PLAY {
            return Err(GameError::illegal(format!(
                "must play between 1 and {} cards",
                MAX_CARDS_PER_PLAY
            )));
        }
        let selected: HashSet<&str> = card_ids.iter().map(String::as_str).collect();
        if selected.len() != card_ids.len() {
            return Err(GameError::illegal("duplicate card ids"));
        }

        let player = self
            .players
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or_else(|| GameError::illegal("player is not seated"))?;
        let owned = player
            .hand
            .iter()
            .filter(|card| selected.contains(card.id.as_str()))
            .count();
        if owned != card_ids.len() {
            return Err(GameError::illegal("card not in hand"));
        }

        let (played, kept): (Vec<Card>, Vec<Card>) = std::mem::take(&mut player.hand)
            .into_iter()
            .partition(|card| selected.contains(card.id.as_str()));
        player.hand = kept;
        let hand_empty = player.hand.is_empty();

        self.private_state.field_cards.extend(played.iter().cloned());
        self.private_state.last_played_cards = played;

        game.field_card_count = self.private_state.field_cards.len();
        game.challenge_result = None;
        game.round += 1;

        if hand_empty {
            game.last_player_id = None;
            game.winner = Some(player_id.to_string());
            self.status = RoomStatus::Finished;
            return Ok(PlayOutcome::Won);
        }

        let timeout = self.settings.challenge_timeout();
        let deadline = now
            + chrono::Duration::from_std(timeout).unwrap_or_else(|_| chrono::Duration::zero());
        game.open_challenge(player_id, deadline);

        Ok(PlayOutcome::ChallengeOpened {
            tag: RoundTag {
                room_id: self.id.clone(),
                game_id: game.game_id,
                round: game.round,
            },
            timeout,
        })
    }

    pub fn challenge(&mut self, player_id: &str) -> Result<ChallengeResult, GameError> {
        if self.status != RoomStatus::Playing {
            return Err(GameError::StaleChallengeWindow);
        }
        let game = self
            .game_state
            .as_mut()
            .ok_or(GameError::StaleChallengeWindow)?;
        let challenged_id = game
            .pending_player()
            .map(str::to_string)
            .ok_or(GameError::StaleChallengeWindow)?;
        if challenged_id == player_id {
            return Err(GameError::illegal("cannot challenge your own play"));
        }
        let challenger_name = self
            .players
            .iter()
            .find(|p| p.id == player_id)
            .map(|p| p.name.clone())
            .ok_or_else(|| GameError::illegal("challenger is not seated"))?;

        // Closing the window first is what makes a late timer a no-op
        game.close_challenge();

        let lie = was_lie(&self.private_state.last_played_cards, game.current_call);
        let loser_id = if lie {
            challenged_id.clone()
        } else {
            player_id.to_string()
        };

        let mut field = std::mem::take(&mut self.private_state.field_cards);
        self.private_state.reset();
        game.field_card_count = 0;

        let mut challenged_name = challenged_id.clone();
        let mut loser_name = loser_id.clone();
        for player in self.players.iter_mut() {
            if player.id == challenged_id {
                challenged_name = player.name.clone();
            }
            if player.id == loser_id {
                loser_name = player.name.clone();
                player.hand.append(&mut field);
                player.hand.sort();
            }
        }

        let result = ChallengeResult {
            challenger_name,
            challenged_name,
            was_lie: lie,
            loser_name,
        };
        game.challenge_result = Some(result.clone());
        game.finish_round(&challenged_id);

        Ok(result)
    }

    /// Resolves an unchallenged play once its window expires. Anything that
    /// moved on since the timer was armed turns this into a no-op.
    pub fn resolve_timeout(&mut self, tag: &RoundTag) -> Result<(), GameError> {
        if self.closed || self.status != RoomStatus::Playing || tag.room_id != self.id {
            return Err(GameError::StaleChallengeWindow);
        }
        let game = self
            .game_state
            .as_mut()
            .ok_or(GameError::StaleChallengeWindow)?;
        if game.game_id != tag.game_id || game.round != tag.round {
            return Err(GameError::StaleChallengeWindow);
        }
        let played_by = game
            .close_challenge()
            .ok_or(GameError::StaleChallengeWindow)?;

        // The field stays where it is: an unchallenged play stands
        game.challenge_result = None;
        game.finish_round(&played_by);
        Ok(())
    }

    pub fn remove_player(&mut self, player_id: &str) -> Result<LeaveOutcome, GameError> {
        let index = self
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or_else(|| GameError::illegal("player is not seated"))?;
        let leaver = self.players.remove(index);

        if self.players.is_empty() {
            self.closed = true;
            return Ok(LeaveOutcome::RoomEmpty);
        }

        if self.creator_id == player_id {
            self.creator_id = self.players[0].id.clone();
        }

        if self.status == RoomStatus::Waiting {
            return Ok(LeaveOutcome::Left);
        }

        // Keep every dealt card accounted for
        self.private_state.field_cards.extend(leaver.hand);

        if let Some(game) = self.game_state.as_mut() {
            game.field_card_count = self.private_state.field_cards.len();

            if self.status == RoomStatus::Playing {
                if game.pending_player() == Some(player_id) {
                    game.close_challenge();
                    game.challenge_result = None;
                    game.finish_round(player_id);
                } else if game.turn_player_id == player_id {
                    if let Some(next) = next_in_order(&game.turn_order, player_id) {
                        game.turn_player_id = next;
                    }
                }
                game.turn_order.retain(|id| id != player_id);

                if game.turn_order.len() < MIN_PLAYERS_TO_START {
                    game.close_challenge();
                    game.winner = game.turn_order.first().cloned();
                    self.status = RoomStatus::Finished;
                }
            }
        }

        Ok(LeaveOutcome::Left)
    }
}
