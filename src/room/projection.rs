use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::models::{Room, RoomStatus, Settings};
use crate::game::{Card, GameState};

/// What other players may know about a seat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    pub name: String,
    pub card_count: usize,
}

/// One player's view of a room: shared public state plus their own hand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateView {
    pub room_id: String,
    pub status: RoomStatus,
    pub settings: Settings,
    pub players: HashMap<String, PlayerSummary>,
    pub game_state: Option<GameState>,
    pub my_hand: Vec<Card>,
    pub creator_id: String,
}

pub fn project(room: &Room, viewer_id: &str) -> StateView {
    let players = room
        .players()
        .iter()
        .map(|p| {
            (
                p.id.clone(),
                PlayerSummary {
                    name: p.name.clone(),
                    card_count: p.hand.len(),
                },
            )
        })
        .collect();

    let my_hand = room
        .player(viewer_id)
        .map(|p| p.hand.clone())
        .unwrap_or_default();

    StateView {
        room_id: room.id.clone(),
        status: room.status,
        settings: room.settings,
        players,
        game_state: room.game_state.clone(),
        my_hand,
        creator_id: room.creator_id.clone(),
    }
}

/// One view per seated player, in seat order
pub fn project_all(room: &Room) -> Vec<(String, StateView)> {
    room.players()
        .iter()
        .map(|p| (p.id.clone(), project(room, &p.id)))
        .collect()
}
