//! Unified error type for the Scribble server.

use scribble_protocol::ProtocolError;
use scribble_room::RoomError;
use scribble_transport::TransportError;
use scribble_words::WordError;

/// Top-level error that wraps all crate-specific errors.
///
/// Each variant is `transparent`, so the message a client sees in an
/// `error` event is the inner error's own text.
#[derive(Debug, thiserror::Error)]
pub enum ScribbleError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, bad room code).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (not found, full, not the owner, ...).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The word list could not be loaded.
    #[error(transparent)]
    Words(#[from] WordError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let scribble_err: ScribbleError = err.into();
        assert!(matches!(scribble_err, ScribbleError::Transport(_)));
        assert!(scribble_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidRoomCode("abc".into());
        let scribble_err: ScribbleError = err.into();
        assert!(matches!(scribble_err, ScribbleError::Protocol(_)));
        assert!(scribble_err.to_string().contains("abc"));
    }

    #[test]
    fn test_from_room_error_keeps_player_facing_text() {
        let scribble_err: ScribbleError = RoomError::RoomFull.into();
        assert!(matches!(scribble_err, ScribbleError::Room(_)));
        assert_eq!(scribble_err.to_string(), "room is full");
    }

    #[test]
    fn test_from_word_error() {
        let scribble_err: ScribbleError = WordError::EmptyWordList.into();
        assert!(matches!(scribble_err, ScribbleError::Words(_)));
    }
}
