//! Players and the player → room back-reference.

use dashmap::DashMap;
use scribble_protocol::{PlayerId, PlayerName, PlayerView, RoomCode};

/// A member of a room.
///
/// Lives inside its [`Room`](crate::Room) and is only mutated under that
/// room's lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub score: u32,
    pub is_drawer: bool,
    pub has_guessed_correctly: bool,
    pub room: RoomCode,
    /// Cleared when the player's outbound channel is found closed.
    pub connected: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: PlayerName, room: RoomCode) -> Self {
        Self {
            id,
            name: name.into_inner(),
            score: 0,
            is_drawer: false,
            has_guessed_correctly: false,
            room,
            connected: true,
        }
    }

    /// Client-facing snapshot. `owner` is the room's current owner.
    pub fn view(&self, owner: Option<PlayerId>) -> PlayerView {
        PlayerView {
            id: self.id,
            name: self.name.clone(),
            score: self.score,
            is_drawer: self.is_drawer,
            has_guessed_correctly: self.has_guessed_correctly,
            is_owner: owner == Some(self.id),
        }
    }
}

/// Which room each connected player is in.
///
/// Updated alongside every membership change so "room of player" is a
/// single lookup rather than a scan over rooms. A player is in at most
/// one room.
#[derive(Debug, Default)]
pub struct PlayerDirectory {
    rooms: DashMap<PlayerId, RoomCode>,
}

impl PlayerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn room_of(&self, player: PlayerId) -> Option<RoomCode> {
        self.rooms.get(&player).map(|entry| entry.value().clone())
    }

    /// Records `player` as a member of `room`, returning the previous room.
    pub fn insert(&self, player: PlayerId, room: RoomCode) -> Option<RoomCode> {
        self.rooms.insert(player, room)
    }

    pub fn remove(&self, player: PlayerId) -> Option<RoomCode> {
        self.rooms.remove(&player).map(|(_, room)| room)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
