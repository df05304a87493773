use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{
    errors::GameError,
    models::{LeaveOutcome, PlayOutcome, Room},
    registry::{normalize_room_code, RoomRegistry, SharedRoom},
    timer::{schedule_challenge_timeout, RoundTag},
};
use crate::{
    config::GameConfig,
    game::{shuffled_deck, Card},
    websockets::{
        broadcaster::StateBroadcaster, connection_manager::ConnectionManager,
        messages::WebSocketMessage,
    },
};

/// Coordinates every room transition. Each call locks exactly one room for
/// the duration of the transition, renders the resulting views while still
/// holding the lock, then delivers them once the lock is released.
#[derive(Clone)]
pub struct RoomService {
    registry: Arc<RoomRegistry>,
    broadcaster: StateBroadcaster,
    config: GameConfig,
}

impl RoomService {
    pub fn new(
        registry: Arc<RoomRegistry>,
        connection_manager: Arc<dyn ConnectionManager>,
        config: GameConfig,
    ) -> Self {
        Self {
            registry,
            broadcaster: StateBroadcaster::new(connection_manager),
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    async fn find_room(&self, room_id: &str) -> Result<SharedRoom, GameError> {
        self.registry
            .get(room_id)
            .await
            .ok_or(GameError::RoomNotFound)
    }

    /// Runs `transition` under the room lock and broadcasts on success.
    /// `ack` goes to its recipient before the broadcast.
    async fn apply<T>(
        &self,
        room_id: &str,
        ack: Option<(&str, WebSocketMessage)>,
        transition: impl FnOnce(&mut Room) -> Result<T, GameError>,
    ) -> Result<T, GameError> {
        let room = self.find_room(room_id).await?;

        let (result, updates) = {
            let mut room = room.lock().await;
            if room.is_closed() {
                return Err(GameError::RoomNotFound);
            }
            let result = transition(&mut room)?;
            (result, StateBroadcaster::render(&room))
        };

        if let Some((player_id, message)) = ack {
            self.broadcaster.send_to(player_id, &message).await;
        }
        self.broadcaster.deliver(updates).await;
        Ok(result)
    }

    /// Creates a room with the caller as creator and first player
    #[instrument(skip(self))]
    pub async fn create_room(&self, player_id: &str, player_name: &str) -> String {
        let (room_id, room) = self
            .registry
            .create(
                player_id,
                player_name,
                self.config.default_settings(),
                self.config.max_players,
            )
            .await;

        let updates = {
            let room = room.lock().await;
            StateBroadcaster::render(&room)
        };
        self.broadcaster
            .send_to(player_id, &WebSocketMessage::room_created(room_id.clone()))
            .await;
        self.broadcaster.deliver(updates).await;

        info!(room_id = %room_id, player_id = %player_id, "Room created");
        room_id
    }

    /// Seats the caller in an existing room. Returns the normalised room code.
    #[instrument(skip(self))]
    pub async fn join_room(
        &self,
        room_id: &str,
        player_id: &str,
        player_name: &str,
    ) -> Result<String, GameError> {
        let room_id = normalize_room_code(room_id);
        let ack = WebSocketMessage::joined_room(room_id.clone());

        self.apply(&room_id, Some((player_id, ack)), |room| {
            room.add_player(player_id, player_name)
        })
        .await?;

        info!(room_id = %room_id, player_id = %player_id, "Player joined room");
        Ok(room_id)
    }

    #[instrument(skip(self))]
    pub async fn change_settings(
        &self,
        room_id: &str,
        player_id: &str,
        challenge_timeout_seconds: u64,
    ) -> Result<(), GameError> {
        self.apply(room_id, None, |room| {
            room.change_settings(player_id, challenge_timeout_seconds)
        })
        .await?;

        info!(
            room_id = %room_id,
            challenge_timeout_seconds = challenge_timeout_seconds,
            "Settings changed"
        );
        Ok(())
    }

    /// Starts a game with a freshly shuffled deck
    #[instrument(skip(self))]
    pub async fn start_game(&self, room_id: &str, player_id: &str) -> Result<(), GameError> {
        let deck = shuffled_deck(self.config.jokers);
        self.start_game_with_deck(room_id, player_id, deck).await
    }

    /// Starts a game dealing `deck` exactly as given
    #[instrument(skip(self, deck))]
    pub async fn start_game_with_deck(
        &self,
        room_id: &str,
        player_id: &str,
        deck: Vec<Card>,
    ) -> Result<(), GameError> {
        let deck_size = deck.len();
        self.apply(room_id, None, |room| room.start_game(player_id, deck))
            .await?;

        info!(room_id = %room_id, deck_size = deck_size, "Game started");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn play_cards(
        &self,
        room_id: &str,
        player_id: &str,
        card_ids: &[String],
    ) -> Result<PlayOutcome, GameError> {
        let now = Utc::now();
        let outcome = self
            .apply(room_id, None, |room| room.play_cards(player_id, card_ids, now))
            .await?;

        match &outcome {
            PlayOutcome::Won => {
                info!(room_id = %room_id, winner = %player_id, "Game won");
            }
            PlayOutcome::ChallengeOpened { tag, timeout } => {
                info!(
                    room_id = %room_id,
                    player_id = %player_id,
                    cards = card_ids.len(),
                    round = tag.round,
                    "Cards played, challenge window open"
                );
                schedule_challenge_timeout(self.clone(), tag.clone(), *timeout);
            }
        }
        Ok(outcome)
    }

    #[instrument(skip(self))]
    pub async fn challenge(&self, room_id: &str, player_id: &str) -> Result<(), GameError> {
        let result = self
            .apply(room_id, None, |room| room.challenge(player_id))
            .await?;

        info!(
            room_id = %room_id,
            challenger = %result.challenger_name,
            challenged = %result.challenged_name,
            was_lie = result.was_lie,
            loser = %result.loser_name,
            "Challenge resolved"
        );
        Ok(())
    }

    /// Resolves the tagged round as unchallenged, unless it already resolved
    pub async fn resolve_timeout(&self, tag: &RoundTag) -> Result<(), GameError> {
        self.apply(&tag.room_id, None, |room| room.resolve_timeout(tag))
            .await?;

        info!(room_id = %tag.room_id, round = tag.round, "Challenge window expired");
        Ok(())
    }

    /// Removes a player. The room is dropped from the registry once empty.
    #[instrument(skip(self))]
    pub async fn leave_room(&self, room_id: &str, player_id: &str) -> Result<(), GameError> {
        let outcome = self
            .apply(room_id, None, |room| room.remove_player(player_id))
            .await?;

        match outcome {
            LeaveOutcome::RoomEmpty => {
                self.registry.remove(room_id).await;
                info!(room_id = %room_id, player_id = %player_id, "Last player left, room closed");
            }
            LeaveOutcome::Left => {
                info!(room_id = %room_id, player_id = %player_id, "Player left room");
            }
        }
        Ok(())
    }

    /// A copy of the room as it is right now
    pub async fn room_snapshot(&self, room_id: &str) -> Option<Room> {
        let room = self.registry.get(room_id).await?;
        let room = room.lock().await;
        debug!(room_id = %room_id, status = ?room.status, "Room snapshot taken");
        Some(room.clone())
    }
}
