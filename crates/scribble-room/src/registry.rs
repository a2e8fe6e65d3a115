//! Room registry: creates, tracks, and routes players to rooms.
//!
//! Locking is two-level. The registry's maps are `DashMap`s (sharded, so
//! unrelated lookups don't contend) and each room sits behind its own
//! `tokio::sync::Mutex`. Lookups clone the room's `Arc` out of the map
//! and drop the shard guard before locking the room, so no map guard is
//! ever held across an `.await`.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use scribble_protocol::{
    CanvasUpdate, PlayerId, PlayerName, PlayerView, Recipient, RoomCode, RoundStarted,
    ServerEvent,
};
use scribble_words::WordList;
use tokio::sync::Mutex;

use crate::driver::run_game_clock;
use crate::{
    GameConfig, GuessOutcome, JoinOutcome, PlayerDirectory, PlayerSender, Room, RoomError,
    RoundStart, events,
};

/// What [`RoomRegistry::leave_room`] reports back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeftRoom {
    pub code: RoomCode,
    pub player_name: String,
}

/// Every live room on the server, plus the player → room index.
///
/// This is the entry point for room operations from the connection
/// handler. All methods take `&self`; share it as an `Arc`.
pub struct RoomRegistry {
    rooms: DashMap<RoomCode, Arc<Mutex<Room>>>,
    players: PlayerDirectory,
    config: GameConfig,
    words: Arc<WordList>,
}

impl RoomRegistry {
    pub fn new(config: GameConfig, words: Arc<WordList>) -> Self {
        Self {
            rooms: DashMap::new(),
            players: PlayerDirectory::new(),
            config,
            words,
        }
    }

    // -----------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------

    /// Creates a room with `owner` already in it and sends them
    /// `room_created`.
    ///
    /// If `owner` was in another room they leave it first.
    pub async fn create_room(
        &self,
        owner: PlayerId,
        name: PlayerName,
        sender: PlayerSender,
    ) -> Result<RoomCode, RoomError> {
        self.leave_room(owner).await;

        for _ in 0..self.config.code_attempts.max(1) {
            let code = {
                let mut rng = rand::rng();
                RoomCode::generate(&mut rng)
            };
            // The shard guard is held only for this synchronous block.
            match self.rooms.entry(code.clone()) {
                Entry::Occupied(_) => {
                    tracing::debug!(%code, "room code collision, retrying");
                    continue;
                }
                Entry::Vacant(slot) => {
                    let mut room = Room::new(code.clone(), self.config.clone());
                    room.join(owner, name, sender)?;
                    room.dispatch(vec![(
                        Recipient::Player(owner),
                        ServerEvent::RoomCreated {
                            room_id: code.clone(),
                        },
                    )]);
                    slot.insert(Arc::new(Mutex::new(room)));
                }
            }
            self.players.insert(owner, code.clone());
            tracing::info!(%code, %owner, rooms = self.rooms.len(), "room created");
            return Ok(code);
        }

        tracing::warn!(attempts = self.config.code_attempts, "room code space exhausted");
        Err(RoomError::CodeSpaceExhausted)
    }

    /// Adds a player to a room and returns the player list.
    ///
    /// The joiner gets `room_joined`; everyone else gets `player_joined`.
    /// Joining a room you are already in just re-sends the snapshot.
    /// Joining while in a different room leaves that room first.
    pub async fn join_room(
        &self,
        code: &RoomCode,
        player: PlayerId,
        name: PlayerName,
        sender: PlayerSender,
    ) -> Result<Vec<PlayerView>, RoomError> {
        let arc = self.room(code).ok_or_else(|| RoomError::NotFound(code.clone()))?;

        if let Some(current) = self.players.room_of(player) {
            if current != *code {
                self.leave_room(player).await;
            }
        }

        let mut room = arc.lock().await;
        let outcome = room.join(player, name, sender)?;
        self.players.insert(player, code.clone());

        let players = room.views();
        let mut batch = vec![(
            Recipient::Player(player),
            ServerEvent::RoomJoined {
                room_id: code.clone(),
                players: players.clone(),
            },
        )];
        if outcome == JoinOutcome::Joined {
            if let Some(view) = players.iter().find(|p| p.id == player) {
                batch.push((
                    Recipient::AllExcept(player),
                    ServerEvent::PlayerJoined {
                        player: view.clone(),
                    },
                ));
            }
        }
        // Late joiners see the running round, without the word.
        if let Some(game) = room.game() {
            if game.is_round_active() {
                if let Some(drawer_id) = game.drawer_id() {
                    if drawer_id != player {
                        let drawer_name = room
                            .player(drawer_id)
                            .map(|p| p.name.clone())
                            .unwrap_or_default();
                        batch.push((
                            Recipient::Player(player),
                            ServerEvent::RoundStarted(RoundStarted {
                                is_drawer: false,
                                word: None,
                                seconds: game.seconds_remaining(),
                                round_number: game.round_number(),
                                drawer_id,
                                drawer_name,
                            }),
                        ));
                    }
                }
            }
        }
        room.dispatch(batch);
        Ok(players)
    }

    /// Removes a player from whatever room they are in.
    ///
    /// Idempotent: returns `None` if they are in no room. The rest of the
    /// room gets `player_left`. An emptied room is closed and removed
    /// before this returns.
    pub async fn leave_room(&self, player: PlayerId) -> Option<LeftRoom> {
        let code = self.players.remove(player)?;
        let arc = self.room(&code)?;
        let mut room = arc.lock().await;
        let departure = room.leave(player)?;

        if room.is_empty() {
            room.close();
            self.rooms.remove_if(&code, |_, current| Arc::ptr_eq(current, &arc));
            tracing::info!(%code, rooms = self.rooms.len(), "room destroyed");
        } else {
            let mut batch = vec![(
                Recipient::All,
                ServerEvent::PlayerLeft {
                    player_id: player,
                    player_name: departure.player.name.clone(),
                },
            )];
            if let Some(word) = departure.revealed_word {
                batch.extend(events::round_ended(&room, word));
            } else if departure.new_owner.is_some() {
                batch.push(events::scores_updated(&room));
            }
            room.dispatch(batch);
        }

        Some(LeftRoom {
            code,
            player_name: departure.player.name,
        })
    }

    /// Member snapshots in join order.
    pub async fn list_players(&self, code: &RoomCode) -> Result<Vec<PlayerView>, RoomError> {
        let arc = self.room(code).ok_or_else(|| RoomError::NotFound(code.clone()))?;
        let room = arc.lock().await;
        Ok(room.views())
    }

    // -----------------------------------------------------------------
    // Game flow
    // -----------------------------------------------------------------

    /// Starts a game and its first round, then arms the round clock.
    ///
    /// Sends `game_started` to the room followed by `round_started`.
    pub async fn start_game(&self, code: &RoomCode) -> Result<(), RoomError> {
        self.start_game_as(code, None).await
    }

    /// [`start_game`](Self::start_game) on behalf of a player, who must
    /// own their room.
    pub async fn start_game_by(&self, player: PlayerId) -> Result<(), RoomError> {
        let code = self.players.room_of(player).ok_or(RoomError::NotInRoom)?;
        self.start_game_as(&code, Some(player)).await
    }

    async fn start_game_as(
        &self,
        code: &RoomCode,
        requester: Option<PlayerId>,
    ) -> Result<(), RoomError> {
        let arc = self.room(code).ok_or_else(|| RoomError::NotFound(code.clone()))?;
        let mut room = arc.lock().await;

        if let Some(player) = requester {
            if room.owner() != Some(player) {
                return Err(RoomError::NotOwner);
            }
        }
        if self.words.is_empty() {
            return Err(RoomError::NoWordsAvailable);
        }

        room.start_game()?;
        let players = room.views();
        room.dispatch(vec![(
            Recipient::All,
            ServerEvent::GameStarted {
                room_id: code.clone(),
                players,
                seconds: self.config.round_seconds,
                round_number: 0,
            },
        )]);

        let started = {
            let mut rng = rand::rng();
            room.start_round(&self.words, &mut rng)
        };
        let start = match started {
            Ok(start) => start,
            Err(e) => {
                room.end_game();
                return Err(e);
            }
        };
        room.dispatch(events::round_started(&start));

        if let Some(token) = room.timer_mut().arm() {
            tokio::spawn(run_game_clock(
                Arc::downgrade(&arc),
                token,
                Arc::clone(&self.words),
            ));
        }
        Ok(())
    }

    /// Starts the next round by hand. A running round clock picks it up
    /// at the end of its intermission.
    pub async fn start_round(&self, code: &RoomCode) -> Result<RoundStart, RoomError> {
        let arc = self.room(code).ok_or_else(|| RoomError::NotFound(code.clone()))?;
        let mut room = arc.lock().await;
        let start = {
            let mut rng = rand::rng();
            room.start_round(&self.words, &mut rng)?
        };
        room.dispatch(events::round_started(&start));
        Ok(start)
    }

    /// Judges a guess and broadcasts `correct_guess` + `scores_updated` if
    /// it scored. Returns whether it scored.
    pub async fn check_guess(
        &self,
        code: &RoomCode,
        player: PlayerId,
        text: &str,
    ) -> Result<bool, RoomError> {
        let arc = self.room(code).ok_or_else(|| RoomError::NotFound(code.clone()))?;
        let mut room = arc.lock().await;
        let outcome = room.evaluate_guess(player, text);
        if let GuessOutcome::Correct { word, drawer, .. } = &outcome {
            let batch = events::correct_guess(&room, player, *drawer, word);
            room.dispatch(batch);
        }
        Ok(outcome.is_correct())
    }

    /// Ends the active round, broadcasting `round_ended` + `scores_updated`.
    pub async fn end_round(&self, code: &RoomCode) -> Result<Option<String>, RoomError> {
        let arc = self.room(code).ok_or_else(|| RoomError::NotFound(code.clone()))?;
        let mut room = arc.lock().await;
        let word = room.end_round();
        if let Some(word) = &word {
            let batch = events::round_ended(&room, word.clone());
            room.dispatch(batch);
        }
        Ok(word)
    }

    /// Stores and broadcasts the time left in the round.
    pub async fn update_timer(&self, code: &RoomCode, seconds: u32) -> Result<(), RoomError> {
        let arc = self.room(code).ok_or_else(|| RoomError::NotFound(code.clone()))?;
        let mut room = arc.lock().await;
        room.update_timer(seconds);
        room.dispatch(vec![(Recipient::All, ServerEvent::TimerUpdate { seconds })]);
        Ok(())
    }

    /// Handles a chat line, which doubles as a guess.
    ///
    /// A scoring guess is not echoed (it would reveal the word); the room
    /// gets `correct_guess` instead. Any other message that is the word
    /// of the active round is dropped. Everything else goes out
    /// as `chat_message`.
    pub async fn post_message(&self, player: PlayerId, text: &str) -> Result<(), RoomError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }
        let code = self.players.room_of(player).ok_or(RoomError::NotInRoom)?;
        let arc = self.room(&code).ok_or(RoomError::NotFound(code))?;
        let mut room = arc.lock().await;
        let player_name = room
            .player(player)
            .map(|p| p.name.clone())
            .ok_or(RoomError::PlayerNotFound)?;

        let outcome = room.evaluate_guess(player, text);
        if let GuessOutcome::Correct { word, drawer, .. } = &outcome {
            let batch = events::correct_guess(&room, player, *drawer, word);
            room.dispatch(batch);
            return Ok(());
        }
        // The round stays active past its deadline until the clock ends it.
        if room
            .game()
            .is_some_and(|g| g.is_round_active() && g.matches(text))
        {
            tracing::debug!(room = %room.code(), %player, ?outcome, "dropped message revealing the word");
            return Ok(());
        }
        if outcome == GuessOutcome::UnknownPlayer {
            tracing::warn!(room = %room.code(), %player, "guess from unknown player");
        }

        room.dispatch(vec![(
            Recipient::All,
            ServerEvent::ChatMessage {
                player_name,
                message: text.to_string(),
            },
        )]);
        Ok(())
    }

    /// Relays a drawing action to everyone but its author.
    ///
    /// During an active round only the drawer may draw; anyone else is
    /// ignored. Between rounds any member may draw.
    pub async fn relay_canvas(&self, player: PlayerId, update: CanvasUpdate) -> Result<(), RoomError> {
        let code = self.players.room_of(player).ok_or(RoomError::NotInRoom)?;
        let arc = self.room(&code).ok_or(RoomError::NotFound(code))?;
        let mut room = arc.lock().await;
        if let Some(game) = room.game() {
            if game.is_round_active() && game.drawer_id() != Some(player) {
                tracing::debug!(room = %room.code(), %player, "ignoring stroke from non-drawer");
                return Ok(());
            }
        }
        room.dispatch(vec![(
            Recipient::AllExcept(player),
            ServerEvent::CanvasUpdate(update),
        )]);
        Ok(())
    }

    // -----------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------

    /// The room behind `code`, if live. The shard guard is released
    /// before returning.
    pub fn room(&self, code: &RoomCode) -> Option<Arc<Mutex<Room>>> {
        self.rooms.get(code).map(|entry| Arc::clone(entry.value()))
    }

    pub fn player_room(&self, player: PlayerId) -> Option<RoomCode> {
        self.players.room_of(player)
    }

    pub fn contains(&self, code: &RoomCode) -> bool {
        self.rooms.contains_key(code)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn room_codes(&self) -> Vec<RoomCode> {
        self.rooms.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn words(&self) -> &Arc<WordList> {
        &self.words
    }
}
