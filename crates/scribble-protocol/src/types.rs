//! Core protocol types for Scribble's wire format.
//!
//! Every event travels as a JSON object with the event name under
//! `"event"` and its payload under `"data"`:
//!
//! ```text
//! {"event": "timer_update", "data": {"seconds": 42}}
//! ```
//!
//! Events without a payload (`leave_room`, `pong`, ...) omit `"data"`.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Identifies a player for the lifetime of one connection.
///
/// The server uses the transport's connection id directly, so a player who
/// reconnects is a new player. Serialized as a plain number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// Length of every room code.
pub const ROOM_CODE_LEN: usize = 6;

const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A six-character uppercase alphanumeric room code, e.g. `"K3X9QA"`.
///
/// Codes are what players read out to each other, so they are short and
/// case-insensitive on input: [`RoomCode::parse`] uppercases before
/// validating.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Parses user input into a room code.
    ///
    /// Surrounding whitespace is ignored and letters are uppercased.
    ///
    /// # Errors
    /// [`ProtocolError::InvalidRoomCode`] unless the remainder is exactly
    /// [`ROOM_CODE_LEN`] ASCII letters or digits.
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        let code = raw.trim().to_ascii_uppercase();
        let valid = code.len() == ROOM_CODE_LEN
            && code.bytes().all(|b| b.is_ascii_alphanumeric());
        if valid {
            Ok(Self(code))
        } else {
            Err(ProtocolError::InvalidRoomCode(raw.to_string()))
        }
    }

    /// Draws a random code, uniform over `A-Z0-9` per character.
    ///
    /// Uniqueness is the caller's job: the room registry retries on
    /// collision.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..ROOM_CODE_LEN)
            .map(|_| {
                let idx = rng.random_range(0..ROOM_CODE_ALPHABET.len());
                ROOM_CODE_ALPHABET[idx] as char
            })
            .collect();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A display name as shown in the player list and chat.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerName(String);

impl PlayerName {
    /// Longest name kept, in characters.
    pub const MAX_CHARS: usize = 20;

    /// Name used when the client sends none (or only whitespace).
    pub const ANONYMOUS: &'static str = "Anonymous";

    /// Trims, falls back to [`Self::ANONYMOUS`], and truncates to
    /// [`Self::MAX_CHARS`] characters.
    pub fn normalize(raw: Option<&str>) -> Self {
        let trimmed = raw.map(str::trim).unwrap_or_default();
        if trimmed.is_empty() {
            return Self(Self::ANONYMOUS.to_string());
        }
        Self(trimmed.chars().take(Self::MAX_CHARS).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who inside a room should receive an event.
///
/// Resolved against the room's membership at dispatch time, so a player
/// who left a moment ago is never addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    /// Every member of the room.
    All,
    /// One specific member.
    Player(PlayerId),
    /// Every member except one (usually the originator).
    AllExcept(PlayerId),
}

impl Recipient {
    /// Returns `true` if `player` is addressed by this recipient.
    pub fn includes(&self, player: PlayerId) -> bool {
        match self {
            Self::All => true,
            Self::Player(target) => *target == player,
            Self::AllExcept(excluded) => *excluded != player,
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// A player as seen by clients (player lists, scoreboards).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub score: u32,
    pub is_drawer: bool,
    pub has_guessed_correctly: bool,
    pub is_owner: bool,
}

// ---------------------------------------------------------------------------
// Canvas
// ---------------------------------------------------------------------------

/// One drawing action, relayed as-is from the drawer to everyone else.
///
/// The server does not interpret coordinates or colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CanvasUpdate {
    Start { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    End,
    Color { color: String },
    BrushSize { size: f64 },
    Clear,
}

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// Everything a client can ask the server to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Create a room and become its owner.
    CreateRoom {
        #[serde(default)]
        player_name: Option<String>,
    },
    /// Join an existing room by code. `room_id` is raw user input and is
    /// parsed with [`RoomCode::parse`].
    JoinRoom {
        room_id: String,
        #[serde(default)]
        player_name: Option<String>,
    },
    LeaveRoom,
    StartGame,
    DrawingStart { x: f64, y: f64 },
    DrawingMove { x: f64, y: f64 },
    DrawingEnd,
    ChangeColor { color: String },
    ChangeBrushSize { size: f64 },
    ClearCanvas,
    /// Chat line; doubles as a guess while a round is running.
    SendMessage { message: String },
    /// Keep-alive. Answered with [`ServerEvent::Pong`].
    Ping,
}

impl ClientEvent {
    /// Maps the six drawing events onto a [`CanvasUpdate`].
    ///
    /// Returns the event unchanged in `Err` if it is not a drawing event.
    pub fn into_canvas_update(self) -> Result<CanvasUpdate, Self> {
        match self {
            Self::DrawingStart { x, y } => Ok(CanvasUpdate::Start { x, y }),
            Self::DrawingMove { x, y } => Ok(CanvasUpdate::Move { x, y }),
            Self::DrawingEnd => Ok(CanvasUpdate::End),
            Self::ChangeColor { color } => Ok(CanvasUpdate::Color { color }),
            Self::ChangeBrushSize { size } => Ok(CanvasUpdate::BrushSize { size }),
            Self::ClearCanvas => Ok(CanvasUpdate::Clear),
            other => Err(other),
        }
    }
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// Payload of `round_started`.
///
/// The drawer's copy carries the word; everybody else gets `word: None`,
/// which is left out of the JSON entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundStarted {
    pub is_drawer: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
    pub seconds: u32,
    pub round_number: u32,
    pub drawer_id: PlayerId,
    pub drawer_name: String,
}

/// Payload of `correct_guess`.
///
/// `word` is only filled in for the guesser and the drawer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectGuess {
    pub player_id: PlayerId,
    pub player_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
}

/// Everything the server pushes to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// First event on every connection.
    Connected { player_id: PlayerId, message: String },
    RoomCreated { room_id: RoomCode },
    RoomJoined { room_id: RoomCode, players: Vec<PlayerView> },
    PlayerJoined { player: PlayerView },
    PlayerLeft { player_id: PlayerId, player_name: String },
    GameStarted {
        room_id: RoomCode,
        players: Vec<PlayerView>,
        seconds: u32,
        round_number: u32,
    },
    RoundStarted(RoundStarted),
    TimerUpdate { seconds: u32 },
    RoundEnded { word: String },
    CanvasUpdate(CanvasUpdate),
    ChatMessage { player_name: String, message: String },
    CorrectGuess(CorrectGuess),
    ScoresUpdated { players: Vec<PlayerView> },
    GameEnded { players: Vec<PlayerView> },
    Pong,
    Error { message: String },
}

impl ServerEvent {
    /// Shorthand for an [`ServerEvent::Error`] carrying `message`.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The browser client matches on exact JSON shapes, so these tests pin
    //! the serde attributes down.

    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;

    fn view(id: u64, name: &str) -> PlayerView {
        PlayerView {
            id: PlayerId(id),
            name: name.into(),
            score: 0,
            is_drawer: false,
            has_guessed_correctly: false,
            is_owner: false,
        }
    }

    // -- identity ---------------------------------------------------------

    #[test]
    fn test_player_id_serializes_as_plain_number() {
        assert_eq!(serde_json::to_string(&PlayerId(42)).unwrap(), "42");
        assert_eq!(PlayerId(7).to_string(), "P-7");
    }

    #[test]
    fn test_room_code_parse_uppercases_and_trims() {
        let code = RoomCode::parse("  ab12cd ").unwrap();
        assert_eq!(code.as_str(), "AB12CD");
    }

    #[test]
    fn test_room_code_parse_rejects_wrong_length_and_symbols() {
        assert!(matches!(
            RoomCode::parse("ABC"),
            Err(ProtocolError::InvalidRoomCode(_))
        ));
        assert!(RoomCode::parse("ABCDEFG").is_err());
        assert!(RoomCode::parse("AB-12C").is_err());
        assert!(RoomCode::parse("").is_err());
    }

    #[test]
    fn test_room_code_generate_is_parseable() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let code = RoomCode::generate(&mut rng);
            assert_eq!(code.as_str().len(), ROOM_CODE_LEN);
            assert!(code
                .as_str()
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
            assert_eq!(RoomCode::parse(code.as_str()).unwrap(), code);
        }
    }

    #[test]
    fn test_player_name_normalize() {
        assert_eq!(PlayerName::normalize(Some("  Ann ")).as_str(), "Ann");
        assert_eq!(PlayerName::normalize(Some("   ")).as_str(), "Anonymous");
        assert_eq!(PlayerName::normalize(None).as_str(), "Anonymous");
        let long = "x".repeat(50);
        assert_eq!(
            PlayerName::normalize(Some(&long)).as_str().chars().count(),
            PlayerName::MAX_CHARS
        );
    }

    #[test]
    fn test_recipient_includes() {
        assert!(Recipient::All.includes(PlayerId(1)));
        assert!(Recipient::Player(PlayerId(1)).includes(PlayerId(1)));
        assert!(!Recipient::Player(PlayerId(1)).includes(PlayerId(2)));
        assert!(!Recipient::AllExcept(PlayerId(1)).includes(PlayerId(1)));
        assert!(Recipient::AllExcept(PlayerId(1)).includes(PlayerId(2)));
    }

    // -- client events ----------------------------------------------------

    #[test]
    fn test_client_join_room_decodes_without_name() {
        let ev: ClientEvent =
            serde_json::from_value(json!({"event": "join_room", "data": {"room_id": "abc123"}}))
                .unwrap();
        assert_eq!(
            ev,
            ClientEvent::JoinRoom {
                room_id: "abc123".into(),
                player_name: None
            }
        );
    }

    #[test]
    fn test_client_unit_event_decodes_without_data() {
        let ev: ClientEvent = serde_json::from_value(json!({"event": "start_game"})).unwrap();
        assert_eq!(ev, ClientEvent::StartGame);
    }

    #[test]
    fn test_client_unknown_event_is_rejected() {
        let result: Result<ClientEvent, _> =
            serde_json::from_value(json!({"event": "fly_to_moon", "data": {}}));
        assert!(result.is_err());
    }

    #[test]
    fn test_drawing_events_map_to_canvas_updates() {
        assert_eq!(
            ClientEvent::DrawingMove { x: 1.0, y: 2.0 }.into_canvas_update(),
            Ok(CanvasUpdate::Move { x: 1.0, y: 2.0 })
        );
        assert_eq!(
            ClientEvent::ClearCanvas.into_canvas_update(),
            Ok(CanvasUpdate::Clear)
        );
        assert_eq!(
            ClientEvent::ChangeBrushSize { size: 10.0 }.into_canvas_update(),
            Ok(CanvasUpdate::BrushSize { size: 10.0 })
        );
        assert!(ClientEvent::Ping.into_canvas_update().is_err());
    }

    // -- server events ----------------------------------------------------

    #[test]
    fn test_guesser_round_started_has_no_word_field() {
        let ev = ServerEvent::RoundStarted(RoundStarted {
            is_drawer: false,
            word: None,
            seconds: 90,
            round_number: 1,
            drawer_id: PlayerId(3),
            drawer_name: "Dee".into(),
        });
        let value = serde_json::to_value(&ev).unwrap();
        assert_eq!(value["event"], "round_started");
        assert_eq!(value["data"]["is_drawer"], false);
        assert_eq!(value["data"]["seconds"], 90);
        assert!(value["data"].get("word").is_none());
    }

    #[test]
    fn test_drawer_round_started_carries_word() {
        let ev = ServerEvent::RoundStarted(RoundStarted {
            is_drawer: true,
            word: Some("cat".into()),
            seconds: 90,
            round_number: 1,
            drawer_id: PlayerId(3),
            drawer_name: "Dee".into(),
        });
        let value = serde_json::to_value(&ev).unwrap();
        assert_eq!(value["data"]["word"], "cat");
    }

    #[test]
    fn test_canvas_update_is_nested_under_type() {
        let ev = ServerEvent::CanvasUpdate(CanvasUpdate::Start { x: 1.5, y: 2.0 });
        let value = serde_json::to_value(&ev).unwrap();
        assert_eq!(
            value,
            json!({"event": "canvas_update", "data": {"type": "start", "x": 1.5, "y": 2.0}})
        );

        let ev = ServerEvent::CanvasUpdate(CanvasUpdate::BrushSize { size: 5.0 });
        let value = serde_json::to_value(&ev).unwrap();
        assert_eq!(value["data"]["type"], "brush_size");
    }

    #[test]
    fn test_room_joined_shape() {
        let ev = ServerEvent::RoomJoined {
            room_id: RoomCode::parse("ABC123").unwrap(),
            players: vec![view(1, "Ann")],
        };
        let value = serde_json::to_value(&ev).unwrap();
        assert_eq!(value["data"]["room_id"], "ABC123");
        assert_eq!(value["data"]["players"][0]["name"], "Ann");
        assert_eq!(value["data"]["players"][0]["score"], 0);
    }

    #[test]
    fn test_pong_has_no_data() {
        let value = serde_json::to_value(&ServerEvent::Pong).unwrap();
        assert_eq!(value, json!({"event": "pong"}));
    }

    #[test]
    fn test_error_helper() {
        let value = serde_json::to_value(ServerEvent::error("room ABC123 not found")).unwrap();
        assert_eq!(value["event"], "error");
        assert_eq!(value["data"]["message"], "room ABC123 not found");
    }
}
