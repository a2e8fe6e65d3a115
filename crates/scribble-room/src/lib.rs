//! Rooms and rounds for Scribble.
//!
//! Each room is plain data behind its own `tokio::sync::Mutex`, so rooms
//! proceed in parallel while events inside one room are serialized. A
//! playing room additionally owns one background round clock.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: creates/destroys rooms, routes players, broadcasts
//! - [`Room`]: membership, ownership and the round state machine
//! - [`Game`]: round number, secret word, drawer, deadline, guesses
//! - [`GameConfig`]: round length, player limits, scoring
//! - [`RoomState`]: `Waiting` / `Playing` / `RoundEnded`

mod config;
mod driver;
mod error;
mod events;
mod game;
mod player;
mod registry;
mod room;

pub use config::{GameConfig, RoomState};
pub use error::RoomError;
pub use game::Game;
pub use player::{Player, PlayerDirectory};
pub use registry::{LeftRoom, RoomRegistry};
pub use room::{Departure, GuessOutcome, JoinOutcome, PlayerSender, Room, RoundStart};
