// Public API
pub use cards::{build_deck, shuffled_deck, Card, Suit};
pub use logic::{next_call, next_in_order, was_lie, ChallengeResult, GameState, PrivateState};

// Internal modules
pub mod cards;
pub mod logic;
