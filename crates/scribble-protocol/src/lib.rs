//! Wire protocol for Scribble.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Identity types** ([`PlayerId`], [`RoomCode`], [`PlayerName`]).
//! - **Events** ([`ClientEvent`], [`ServerEvent`], [`CanvasUpdate`]): named
//!   events with JSON payloads.
//! - **Routing** ([`Recipient`]): who inside a room receives an event.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]).
//!
//! It knows nothing about connections, rooms or timers.
//!
//! ```text
//! Transport (frames) → Protocol (events) → Room core (state)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    CanvasUpdate, ClientEvent, CorrectGuess, PlayerId, PlayerName, PlayerView, ROOM_CODE_LEN,
    Recipient, RoomCode, RoundStarted, ServerEvent,
};
