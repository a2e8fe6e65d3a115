//! Game configuration and the room state machine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GameConfig
// ---------------------------------------------------------------------------

/// Tunables shared by every room on a server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Length of one round, in seconds.
    pub round_seconds: u32,

    /// Members needed to start a game (and to keep playing between rounds).
    pub min_players: usize,

    /// Hard cap on room membership.
    pub max_players: usize,

    /// Awarded to a guesser for a correct guess.
    pub guesser_points: u32,

    /// Awarded to the drawer for each distinct correct guesser.
    pub drawer_points: u32,

    /// Rounds per game. 0 means the game runs until players leave.
    pub max_rounds: u32,

    /// Pause between `round_ended` and the next `round_started`.
    pub intermission: Duration,

    /// End a round as soon as every guesser has scored.
    pub end_when_all_guessed: bool,

    /// Random room codes tried before giving up on `create_room`.
    pub code_attempts: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            round_seconds: 90,
            min_players: 2,
            max_players: 10,
            guesser_points: 100,
            drawer_points: 50,
            max_rounds: 5,
            intermission: Duration::from_secs(5),
            end_when_all_guessed: true,
            code_attempts: 64,
        }
    }
}

impl GameConfig {
    pub fn round_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.round_seconds))
    }

    /// Returns `true` once `completed` rounds exhaust the game.
    pub fn is_last_round(&self, completed: u32) -> bool {
        self.max_rounds != 0 && completed >= self.max_rounds
    }
}

// ---------------------------------------------------------------------------
// RoomState
// ---------------------------------------------------------------------------

/// Where a room is in its game lifecycle.
///
/// ```text
/// Waiting ──start game──► Playing ──end round──► RoundEnded
///                            ▲                       │
///                            └──────next round───────┘
///
/// Playing | RoundEnded ──end game──► Waiting
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomState {
    Waiting,
    Playing,
    RoundEnded,
}

impl RoomState {
    /// Returns `true` while a game exists (between rounds included).
    pub fn in_game(&self) -> bool {
        matches!(self, Self::Playing | Self::RoundEnded)
    }
}

impl std::fmt::Display for RoomState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Playing => write!(f, "playing"),
            Self::RoundEnded => write!(f, "round_ended"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_state_in_game() {
        assert!(!RoomState::Waiting.in_game());
        assert!(RoomState::Playing.in_game());
        assert!(RoomState::RoundEnded.in_game());
    }

    #[test]
    fn test_room_state_display() {
        assert_eq!(RoomState::RoundEnded.to_string(), "round_ended");
    }

    #[test]
    fn test_game_config_default() {
        let config = GameConfig::default();
        assert_eq!(config.round_seconds, 90);
        assert_eq!(config.min_players, 2);
        assert_eq!(config.max_players, 10);
        assert_eq!(config.guesser_points, 100);
        assert_eq!(config.drawer_points, 50);
        assert_eq!(config.round_duration(), Duration::from_secs(90));
    }

    #[test]
    fn test_is_last_round() {
        let config = GameConfig {
            max_rounds: 3,
            ..GameConfig::default()
        };
        assert!(!config.is_last_round(2));
        assert!(config.is_last_round(3));

        let endless = GameConfig {
            max_rounds: 0,
            ..GameConfig::default()
        };
        assert!(!endless.is_last_round(1_000));
    }
}
