use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

pub const LOWEST_RANK: u8 = 1;
pub const HIGHEST_RANK: u8 = 13;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter,
)]
pub enum Suit {
    #[serde(rename = "s")]
    Spades,
    #[serde(rename = "h")]
    Hearts,
    #[serde(rename = "d")]
    Diamonds,
    #[serde(rename = "c")]
    Clubs,
    #[serde(rename = "j")]
    Joker,
}

impl Suit {
    /// The four suits of a standard deck, jokers excluded
    pub fn standard() -> impl Iterator<Item = Suit> {
        Suit::iter().filter(|suit| *suit != Suit::Joker)
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Suit::Spades => "s",
                Suit::Hearts => "h",
                Suit::Diamonds => "d",
                Suit::Clubs => "c",
                Suit::Joker => "j",
            }
        )
    }
}

/// A single card. The id is unique within one deck and is what clients
/// send back when playing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub suit: Suit,
    /// 1..=13, always 0 for jokers
    pub rank: u8,
    pub is_joker: bool,
}

impl Card {
    pub fn new(rank: u8, suit: Suit) -> Self {
        Self {
            id: format!("{}{}", suit, rank),
            suit,
            rank,
            is_joker: false,
        }
    }

    pub fn joker(index: usize) -> Self {
        Self {
            id: format!("{}{}", Suit::Joker, index),
            suit: Suit::Joker,
            rank: 0,
            is_joker: true,
        }
    }

    /// Whether this card honestly backs a claim of `call`. Jokers back any call.
    pub fn matches_call(&self, call: u8) -> bool {
        self.is_joker || self.rank == call
    }
}

// Display order: rank ascending, jokers last, suit breaks ties.
impl PartialOrd for Card {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Card {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.is_joker, self.rank, self.suit, &self.id).cmp(&(
            other.is_joker,
            other.rank,
            other.suit,
            &other.id,
        ))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_joker {
            write!(f, "JOKER")
        } else {
            let rank = match self.rank {
                1 => "A".to_string(),
                11 => "J".to_string(),
                12 => "Q".to_string(),
                13 => "K".to_string(),
                n => n.to_string(),
            };
            write!(f, "{}{}", rank, self.suit)
        }
    }
}

/// Builds an unshuffled deck: every suit/rank pair followed by `jokers` jokers
pub fn build_deck(jokers: usize) -> Vec<Card> {
    let mut cards = Vec::with_capacity(52 + jokers);
    for suit in Suit::standard() {
        for rank in LOWEST_RANK..=HIGHEST_RANK {
            cards.push(Card::new(rank, suit));
        }
    }
    cards.extend((0..jokers).map(Card::joker));
    cards
}

/// Builds a deck and applies a uniform random permutation to it
pub fn shuffled_deck(jokers: usize) -> Vec<Card> {
    let mut cards = build_deck(jokers);
    cards.shuffle(&mut rand::rng());
    cards
}
