use thiserror::Error;

/// Everything that can stop a room transition from applying
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Room not found")]
    RoomNotFound,

    #[error("Room is full")]
    RoomFull,

    #[error("Game has already started")]
    GameAlreadyStarted,

    #[error("Only the room creator can do that")]
    Unauthorized,

    #[error("At least two players are needed to start")]
    NotEnoughPlayers,

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    #[error("Illegal move: {0}")]
    IllegalMove(String),

    #[error("Challenge window already closed")]
    StaleChallengeWindow,
}

impl GameError {
    pub fn illegal(reason: impl Into<String>) -> Self {
        GameError::IllegalMove(reason.into())
    }

    /// Whether the originating player should be told about this error.
    /// The rest are desync or race outcomes and are dropped without a reply.
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            GameError::RoomNotFound
                | GameError::RoomFull
                | GameError::GameAlreadyStarted
                | GameError::NotEnoughPlayers
                | GameError::InvalidSetting(_)
        )
    }
}
