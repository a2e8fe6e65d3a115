//! Error types for the protocol layer.
//!
//! Anything that goes wrong while turning bytes into events (or back), or
//! while parsing an identifier a client typed in, ends up here. Higher
//! layers never see raw `serde_json` errors.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (an event could not be turned into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, an unknown event name,
    /// or a payload with missing/mistyped fields.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A room code that is not exactly six ASCII letters or digits.
    ///
    /// The offending input is kept so it can be echoed in logs.
    #[error("invalid room code: {0:?}")]
    InvalidRoomCode(String),
}
