//! Per-room game and round state.

use std::collections::HashSet;
use std::time::Duration;

use scribble_protocol::PlayerId;
use tokio::time::Instant;

/// A game attached to a room, persisting across its rounds.
///
/// A round is active while both a word and a deadline are set.
#[derive(Debug, Clone, Default)]
pub struct Game {
    round_number: u32,
    current_word: Option<String>,
    drawer_id: Option<PlayerId>,
    deadline: Option<Instant>,
    guessed: HashSet<PlayerId>,
    seconds_remaining: u32,
}

impl Game {
    /// A fresh game at round 0 with no active round.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    pub fn drawer_id(&self) -> Option<PlayerId> {
        self.drawer_id
    }

    /// The secret word. Never send this to anyone but the drawer while
    /// the round is active.
    pub fn current_word(&self) -> Option<&str> {
        self.current_word.as_deref()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    pub fn is_round_active(&self) -> bool {
        self.current_word.is_some() && self.deadline.is_some()
    }

    /// Active and not past its deadline.
    pub fn accepts_guesses(&self) -> bool {
        match self.deadline {
            Some(deadline) => self.current_word.is_some() && Instant::now() <= deadline,
            None => false,
        }
    }

    pub fn has_guessed(&self, player: PlayerId) -> bool {
        self.guessed.contains(&player)
    }

    pub fn guessed_count(&self) -> usize {
        self.guessed.len()
    }

    /// Case- and surrounding-whitespace-insensitive exact match against
    /// the active word.
    pub fn matches(&self, guess: &str) -> bool {
        match &self.current_word {
            Some(word) => guess.trim().to_lowercase() == word.trim().to_lowercase(),
            None => false,
        }
    }

    /// Starts the next round and returns its number.
    pub(crate) fn begin_round(&mut self, drawer: PlayerId, word: String, length: Duration) -> u32 {
        self.round_number += 1;
        self.current_word = Some(word);
        self.drawer_id = Some(drawer);
        self.deadline = Some(Instant::now() + length);
        self.seconds_remaining = u32::try_from(length.as_secs()).unwrap_or(u32::MAX);
        self.guessed.clear();
        self.round_number
    }

    /// Clears word, deadline and guesses; returns the word if a round
    /// was active. The drawer id is kept so clients can still see who
    /// drew during the intermission.
    pub(crate) fn finish_round(&mut self) -> Option<String> {
        if !self.is_round_active() {
            return None;
        }
        self.deadline = None;
        self.guessed.clear();
        self.seconds_remaining = 0;
        self.current_word.take()
    }

    /// Records a correct guess. Returns `false` if `player` had already
    /// guessed this round.
    pub(crate) fn record_guess(&mut self, player: PlayerId) -> bool {
        self.guessed.insert(player)
    }

    pub(crate) fn forget_player(&mut self, player: PlayerId) {
        self.guessed.remove(&player);
        if self.drawer_id == Some(player) {
            self.drawer_id = None;
        }
    }

    pub(crate) fn set_seconds_remaining(&mut self, seconds: u32) {
        self.seconds_remaining = seconds;
    }
}
