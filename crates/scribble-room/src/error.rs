//! Error types for the room layer.
//!
//! The `Display` text of each variant is sent verbatim to the client in an
//! `error` event, so it is phrased for players.

use scribble_protocol::RoomCode;
use scribble_words::WordError;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No live room has this code.
    #[error("room {0} not found")]
    NotFound(RoomCode),

    #[error("room is full")]
    RoomFull,

    /// Not enough members to start (or continue) a game.
    #[error("need at least {needed} players to start, have {present}")]
    InsufficientPlayers { needed: usize, present: usize },

    /// The word list is empty, so no round can start.
    #[error("no words available")]
    NoWordsAvailable,

    #[error("player not found")]
    PlayerNotFound,

    /// The acting connection is not a member of any room.
    #[error("you are not in a room")]
    NotInRoom,

    #[error("a game is already in progress")]
    GameInProgress,

    #[error("the game has not started")]
    GameNotStarted,

    #[error("only the room owner can start the game")]
    NotOwner,

    /// Every attempted room code collided with a live room.
    #[error("could not allocate a room code")]
    CodeSpaceExhausted,
}

impl From<WordError> for RoomError {
    fn from(err: WordError) -> Self {
        tracing::warn!(error = %err, "word selection failed");
        Self::NoWordsAvailable
    }
}
