//! # Scribble
//!
//! Real-time multiplayer draw-and-guess game server.
//!
//! Players connect over WebSocket, gather in rooms identified by a
//! six-character code, and take turns drawing a secret word while the
//! others race to guess it. The server owns all game state: rooms, rounds,
//! scores and the per-round countdown.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scribble::prelude::*;
//!
//! # async fn run() -> Result<(), ScribbleError> {
//! let server = ScribbleServer::builder()
//!     .bind("0.0.0.0:5000")
//!     .game_config(GameConfig {
//!         round_seconds: 60,
//!         ..GameConfig::default()
//!     })
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::ScribbleError;
pub use server::{DEFAULT_IDLE_TIMEOUT, ScribbleServer, ScribbleServerBuilder, ServerConfig};

/// Everything needed to configure and run a server.
pub mod prelude {
    pub use crate::{ScribbleError, ScribbleServer, ScribbleServerBuilder, ServerConfig};
    pub use scribble_protocol::{
        CanvasUpdate, ClientEvent, PlayerId, PlayerView, RoomCode, ServerEvent,
    };
    pub use scribble_room::{GameConfig, RoomError};
    pub use scribble_words::WordList;
}
