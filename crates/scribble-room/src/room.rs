//! A single room: membership, ownership, and the game state machine.
//!
//! A `Room` is plain data plus synchronous methods. The registry wraps
//! each one in its own `tokio::sync::Mutex`, so every method here runs
//! with exclusive access to the room and nothing in this file awaits.

use std::collections::HashMap;

use rand::Rng;
use rand::seq::IndexedRandom;
use scribble_protocol::{PlayerId, PlayerName, PlayerView, Recipient, RoomCode, ServerEvent};
use scribble_tick::TimerSlot;
use scribble_words::WordList;
use tokio::sync::mpsc;

use crate::{Game, GameConfig, Player, RoomError, RoomState};

/// Channel sender for delivering events to a player's connection.
pub type PlayerSender = mpsc::UnboundedSender<ServerEvent>;

/// Result of [`Room::join`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// A new member was added.
    Joined,
    /// The player was already a member; nothing changed except the
    /// outbound channel.
    AlreadyMember,
}

/// What changed when a player left.
#[derive(Debug)]
pub struct Departure {
    pub player: Player,
    /// Set if ownership moved to another member.
    pub new_owner: Option<PlayerId>,
    /// Set if the leaver was drawing an active round, which ended it.
    pub revealed_word: Option<String>,
}

/// A freshly started round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundStart {
    pub round_number: u32,
    pub drawer_id: PlayerId,
    pub drawer_name: String,
    /// Only ever sent to the drawer.
    pub word: String,
    pub seconds: u32,
}

/// How a chat line was judged as a guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuessOutcome {
    /// No round is running (or its deadline has passed).
    NoActiveRound,
    /// The drawer's messages are never scored.
    Drawer,
    /// The player already scored this round.
    AlreadyGuessed,
    Incorrect,
    /// The sender is not a member of this room.
    UnknownPlayer,
    /// First correct guess by this player this round; points applied.
    Correct {
        word: String,
        points: u32,
        drawer: Option<PlayerId>,
        drawer_points: u32,
    },
}

impl GuessOutcome {
    pub fn is_correct(&self) -> bool {
        matches!(self, Self::Correct { .. })
    }
}

/// One game room.
#[derive(Debug)]
pub struct Room {
    code: RoomCode,
    owner_id: Option<PlayerId>,
    /// Insertion order; the first member inherits ownership.
    players: Vec<Player>,
    senders: HashMap<PlayerId, PlayerSender>,
    state: RoomState,
    game: Option<Game>,
    config: GameConfig,
    timer: TimerSlot,
    /// Set when the room is removed from the registry. A closed room
    /// rejects joins, so a join racing teardown sees "not found".
    closed: bool,
}

impl Room {
    pub fn new(code: RoomCode, config: GameConfig) -> Self {
        Self {
            code,
            owner_id: None,
            players: Vec::new(),
            senders: HashMap::new(),
            state: RoomState::Waiting,
            game: None,
            config,
            timer: TimerSlot::new(),
            closed: false,
        }
    }

    // -----------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------

    /// Adds a player. The first member becomes the owner.
    ///
    /// Joining mid-game is allowed; the newcomer can guess right away.
    pub fn join(
        &mut self,
        id: PlayerId,
        name: PlayerName,
        sender: PlayerSender,
    ) -> Result<JoinOutcome, RoomError> {
        if self.closed {
            return Err(RoomError::NotFound(self.code.clone()));
        }
        if self.contains(id) {
            self.senders.insert(id, sender);
            return Ok(JoinOutcome::AlreadyMember);
        }
        if self.players.len() >= self.config.max_players {
            return Err(RoomError::RoomFull);
        }

        self.players.push(Player::new(id, name, self.code.clone()));
        self.senders.insert(id, sender);
        if self.owner_id.is_none() {
            self.owner_id = Some(id);
        }

        tracing::info!(
            room = %self.code,
            player = %id,
            players = self.players.len(),
            "player joined"
        );
        Ok(JoinOutcome::Joined)
    }

    /// Removes a player. Returns `None` if they were not a member.
    ///
    /// If the drawer leaves an active round, the round ends on the spot
    /// and the word is returned for broadcast. Nobody is promoted to
    /// drawer mid-round.
    pub fn leave(&mut self, id: PlayerId) -> Option<Departure> {
        let idx = self.players.iter().position(|p| p.id == id)?;
        let player = self.players.remove(idx);
        self.senders.remove(&id);

        let mut revealed_word = None;
        if let Some(game) = self.game.as_mut() {
            if game.drawer_id() == Some(id) && game.is_round_active() {
                revealed_word = game.finish_round();
                self.state = RoomState::RoundEnded;
                for p in &mut self.players {
                    p.has_guessed_correctly = false;
                }
                tracing::info!(room = %self.code, player = %id, "drawer left, round ended");
            }
            game.forget_player(id);
        }

        let mut new_owner = None;
        if self.owner_id == Some(id) {
            self.owner_id = self.players.first().map(|p| p.id);
            new_owner = self.owner_id;
        }

        tracing::info!(
            room = %self.code,
            player = %id,
            players = self.players.len(),
            "player left"
        );
        Some(Departure {
            player,
            new_owner,
            revealed_word,
        })
    }

    // -----------------------------------------------------------------
    // Game lifecycle
    // -----------------------------------------------------------------

    /// Attaches a new game at round 0. Scores from a previous game are
    /// reset.
    pub fn start_game(&mut self) -> Result<(), RoomError> {
        if self.state.in_game() {
            return Err(RoomError::GameInProgress);
        }
        if self.players.len() < self.config.min_players {
            return Err(RoomError::InsufficientPlayers {
                needed: self.config.min_players,
                present: self.players.len(),
            });
        }

        for p in &mut self.players {
            p.score = 0;
            p.is_drawer = false;
            p.has_guessed_correctly = false;
        }
        self.game = Some(Game::new());
        self.state = RoomState::Playing;
        tracing::info!(room = %self.code, players = self.players.len(), "game started");
        Ok(())
    }

    /// Picks a drawer among the connected members and a word, both
    /// uniformly at random, and starts the next round. The same player
    /// may draw twice in a row.
    ///
    /// Nothing changes if this fails.
    pub fn start_round<R: Rng + ?Sized>(
        &mut self,
        words: &WordList,
        rng: &mut R,
    ) -> Result<RoundStart, RoomError> {
        let Some(game) = self.game.as_mut() else {
            return Err(RoomError::GameNotStarted);
        };
        if game.is_round_active() {
            return Err(RoomError::GameInProgress);
        }

        let word = words.pick_random(rng)?.to_string();
        let connected: Vec<&Player> = self.players.iter().filter(|p| p.connected).collect();
        let Some(drawer) = connected.choose(rng) else {
            return Err(RoomError::InsufficientPlayers {
                needed: self.config.min_players,
                present: 0,
            });
        };
        let drawer_id = drawer.id;
        let drawer_name = drawer.name.clone();

        for p in &mut self.players {
            p.is_drawer = p.id == drawer_id;
            p.has_guessed_correctly = false;
        }
        let round_number =
            game.begin_round(drawer_id, word.clone(), self.config.round_duration());
        self.state = RoomState::Playing;

        tracing::info!(
            room = %self.code,
            round = round_number,
            drawer = %drawer_id,
            "round started"
        );
        Ok(RoundStart {
            round_number,
            drawer_id,
            drawer_name,
            word,
            seconds: self.config.round_seconds,
        })
    }

    /// Judges `text` as a guess by `id` and applies the score if correct.
    ///
    /// The already-guessed check and both awards happen in this one call,
    /// so a player can never score twice in a round.
    pub fn evaluate_guess(&mut self, id: PlayerId, text: &str) -> GuessOutcome {
        let Some(game) = self.game.as_mut() else {
            return GuessOutcome::NoActiveRound;
        };
        if !game.accepts_guesses() {
            return GuessOutcome::NoActiveRound;
        }
        let drawer = game.drawer_id();
        if drawer == Some(id) {
            return GuessOutcome::Drawer;
        }
        let Some(idx) = self.players.iter().position(|p| p.id == id) else {
            return GuessOutcome::UnknownPlayer;
        };
        if game.has_guessed(id) || self.players[idx].has_guessed_correctly {
            return GuessOutcome::AlreadyGuessed;
        }
        if !game.matches(text) {
            return GuessOutcome::Incorrect;
        }

        game.record_guess(id);
        let word = game.current_word().unwrap_or_default().to_string();
        let points = self.config.guesser_points;
        let drawer_points = self.config.drawer_points;

        let guesser = &mut self.players[idx];
        guesser.has_guessed_correctly = true;
        guesser.score += points;

        if let Some(drawer_id) = drawer {
            if let Some(d) = self.players.iter_mut().find(|p| p.id == drawer_id) {
                d.score += drawer_points;
            }
        }

        tracing::info!(room = %self.code, player = %id, "correct guess");
        GuessOutcome::Correct {
            word,
            points,
            drawer,
            drawer_points,
        }
    }

    /// [`evaluate_guess`](Self::evaluate_guess) reduced to "did it score".
    pub fn check_guess(&mut self, id: PlayerId, text: &str) -> bool {
        self.evaluate_guess(id, text).is_correct()
    }

    /// Ends the active round and returns the word, now safe to reveal.
    ///
    /// Returns `None` if no round was active, so concurrent end paths
    /// (timer, all guessed, drawer left) reveal the word exactly once.
    pub fn end_round(&mut self) -> Option<String> {
        let word = self.game.as_mut()?.finish_round()?;
        self.state = RoomState::RoundEnded;
        for p in &mut self.players {
            p.has_guessed_correctly = false;
        }
        tracing::info!(room = %self.code, "round ended");
        Some(word)
    }

    /// Records the displayed time left. Never triggers a transition.
    pub fn update_timer(&mut self, seconds: u32) {
        if let Some(game) = self.game.as_mut() {
            game.set_seconds_remaining(seconds);
        }
    }

    /// Returns `true` if a round is active, it has at least one connected
    /// guesser, and every connected guesser has scored.
    pub fn all_guessed(&self) -> bool {
        let Some(game) = self.game.as_ref() else {
            return false;
        };
        if !game.is_round_active() {
            return false;
        }
        let mut guessers = self
            .players
            .iter()
            .filter(|p| p.connected && Some(p.id) != game.drawer_id())
            .peekable();
        guessers.peek().is_some() && guessers.all(|p| game.has_guessed(p.id))
    }

    /// Drops the game and returns to `Waiting`. Scores are kept so the
    /// final standings stay visible.
    pub fn end_game(&mut self) {
        self.game = None;
        self.state = RoomState::Waiting;
        self.timer.disarm();
        for p in &mut self.players {
            p.is_drawer = false;
            p.has_guessed_correctly = false;
        }
        tracing::info!(room = %self.code, "game ended");
    }

    /// Marks the room dead: no more joins, and the round clock stops.
    pub fn close(&mut self) {
        self.closed = true;
        self.timer.disarm();
        self.senders.clear();
    }

    // -----------------------------------------------------------------
    // Delivery
    // -----------------------------------------------------------------

    /// Delivers events to the members each recipient resolves to.
    ///
    /// A closed outbound channel marks that player disconnected; their
    /// connection handler runs the leave path shortly after.
    pub fn dispatch(&mut self, events: Vec<(Recipient, ServerEvent)>) {
        for (recipient, event) in events {
            for player in &mut self.players {
                if !recipient.includes(player.id) {
                    continue;
                }
                let Some(sender) = self.senders.get(&player.id) else {
                    continue;
                };
                if sender.send(event.clone()).is_err() && player.connected {
                    player.connected = false;
                    tracing::warn!(
                        room = %self.code,
                        player = %player.id,
                        "outbound channel closed"
                    );
                }
            }
        }
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn owner(&self) -> Option<PlayerId> {
        self.owner_id
    }

    pub fn state(&self) -> RoomState {
        self.state
    }

    pub fn game(&self) -> Option<&Game> {
        self.game.as_ref()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The current drawer, if a game has one.
    pub fn current_drawer(&self) -> Option<PlayerId> {
        self.game.as_ref().and_then(Game::drawer_id)
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.iter().any(|p| p.id == id)
    }

    /// Snapshots of every member, in join order.
    pub fn views(&self) -> Vec<PlayerView> {
        self.players.iter().map(|p| p.view(self.owner_id)).collect()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn connected_count(&self) -> usize {
        self.players.iter().filter(|p| p.connected).count()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub(crate) fn timer_mut(&mut self) -> &mut TimerSlot {
        &mut self.timer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn room() -> Room {
        Room::new(RoomCode::parse("ROOM01").unwrap(), GameConfig::default())
    }

    fn add(room: &mut Room, id: u64, name: &str) -> UnboundedReceiver<ServerEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        room.join(PlayerId(id), PlayerName::normalize(Some(name)), tx)
            .unwrap();
        rx
    }

    fn cat_words() -> WordList {
        WordList::from_words(["cat"])
    }

    /// Room with two members, game started and round 1 running.
    fn playing_room() -> (Room, Vec<UnboundedReceiver<ServerEvent>>, RoundStart) {
        let mut r = room();
        let rxs = vec![add(&mut r, 1, "Host"), add(&mut r, 2, "Pat")];
        r.start_game().unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let start = r.start_round(&cat_words(), &mut rng).unwrap();
        (r, rxs, start)
    }

    fn other(id: PlayerId) -> PlayerId {
        if id == PlayerId(1) { PlayerId(2) } else { PlayerId(1) }
    }

    // -- membership ----------------------------------------------------

    #[test]
    fn test_first_joiner_becomes_owner() {
        let mut r = room();
        let _a = add(&mut r, 1, "Host");
        let _b = add(&mut r, 2, "Pat");
        assert_eq!(r.owner(), Some(PlayerId(1)));
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn test_join_twice_is_already_member() {
        let mut r = room();
        let _a = add(&mut r, 1, "Host");
        let (tx, _rx) = mpsc::unbounded_channel();
        let outcome = r.join(PlayerId(1), PlayerName::normalize(None), tx).unwrap();
        assert_eq!(outcome, JoinOutcome::AlreadyMember);
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn test_join_full_room_fails() {
        let mut r = Room::new(
            RoomCode::parse("ROOM01").unwrap(),
            GameConfig {
                max_players: 2,
                ..GameConfig::default()
            },
        );
        let _a = add(&mut r, 1, "A");
        let _b = add(&mut r, 2, "B");
        let (tx, _rx) = mpsc::unbounded_channel();
        let result = r.join(PlayerId(3), PlayerName::normalize(None), tx);
        assert!(matches!(result, Err(RoomError::RoomFull)));
    }

    #[test]
    fn test_join_closed_room_is_not_found() {
        let mut r = room();
        r.close();
        let (tx, _rx) = mpsc::unbounded_channel();
        let result = r.join(PlayerId(1), PlayerName::normalize(None), tx);
        assert!(matches!(result, Err(RoomError::NotFound(_))));
    }

    #[test]
    fn test_owner_leaving_transfers_to_first_remaining() {
        let mut r = room();
        let _a = add(&mut r, 1, "Host");
        let _b = add(&mut r, 2, "Pat");
        let _c = add(&mut r, 3, "Cy");
        let departure = r.leave(PlayerId(1)).unwrap();
        assert_eq!(departure.new_owner, Some(PlayerId(2)));
        assert_eq!(r.owner(), Some(PlayerId(2)));
    }

    #[test]
    fn test_last_member_leaving_clears_owner() {
        let mut r = room();
        let _a = add(&mut r, 1, "Host");
        r.leave(PlayerId(1)).unwrap();
        assert!(r.is_empty());
        assert_eq!(r.owner(), None);
    }

    #[test]
    fn test_leave_non_member_is_none() {
        let mut r = room();
        assert!(r.leave(PlayerId(9)).is_none());
    }

    // -- game lifecycle ------------------------------------------------

    #[test]
    fn test_start_game_needs_min_players() {
        let mut r = room();
        let _a = add(&mut r, 1, "Host");
        let err = r.start_game().unwrap_err();
        assert!(matches!(
            err,
            RoomError::InsufficientPlayers {
                needed: 2,
                present: 1
            }
        ));
        assert_eq!(r.state(), RoomState::Waiting);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_game_twice_is_in_progress() {
        let (mut r, _rxs, _) = playing_room();
        assert!(matches!(r.start_game(), Err(RoomError::GameInProgress)));
    }

    #[test]
    fn test_start_round_without_game_fails() {
        let mut r = room();
        let _a = add(&mut r, 1, "Host");
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            r.start_round(&cat_words(), &mut rng),
            Err(RoomError::GameNotStarted)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_round_with_empty_words_changes_nothing() {
        let mut r = room();
        let _a = add(&mut r, 1, "Host");
        let _b = add(&mut r, 2, "Pat");
        r.start_game().unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let empty = WordList::from_words(Vec::<String>::new());
        assert!(matches!(
            r.start_round(&empty, &mut rng),
            Err(RoomError::NoWordsAvailable)
        ));
        assert_eq!(r.game().unwrap().round_number(), 0);
        assert!(r.players().iter().all(|p| !p.is_drawer));
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_round_picks_member_and_flags_drawer() {
        let (r, _rxs, start) = playing_room();
        assert!(start.drawer_id == PlayerId(1) || start.drawer_id == PlayerId(2));
        assert_eq!(start.word, "cat");
        assert_eq!(start.round_number, 1);
        assert_eq!(start.seconds, 90);
        assert_eq!(r.current_drawer(), Some(start.drawer_id));
        let drawers: Vec<_> = r.players().iter().filter(|p| p.is_drawer).collect();
        assert_eq!(drawers.len(), 1);
        assert_eq!(drawers[0].id, start.drawer_id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_round_while_active_is_rejected() {
        let (mut r, _rxs, _) = playing_room();
        let mut rng = StdRng::seed_from_u64(3);
        assert!(matches!(
            r.start_round(&cat_words(), &mut rng),
            Err(RoomError::GameInProgress)
        ));
    }

    // -- guessing ------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn test_correct_guess_scores_guesser_and_drawer_once() {
        let (mut r, _rxs, start) = playing_room();
        let guesser = other(start.drawer_id);

        assert!(r.check_guess(guesser, "  CAT "));
        assert!(!r.check_guess(guesser, "cat"));
        assert_eq!(r.evaluate_guess(guesser, "cat"), GuessOutcome::AlreadyGuessed);

        assert_eq!(r.player(guesser).unwrap().score, 100);
        assert_eq!(r.player(start.drawer_id).unwrap().score, 50);
        assert!(r.player(guesser).unwrap().has_guessed_correctly);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drawer_guess_is_never_scored() {
        let (mut r, _rxs, start) = playing_room();
        assert_eq!(r.evaluate_guess(start.drawer_id, "cat"), GuessOutcome::Drawer);
        assert_eq!(r.player(start.drawer_id).unwrap().score, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wrong_and_partial_guesses_are_incorrect() {
        let (mut r, _rxs, start) = playing_room();
        let guesser = other(start.drawer_id);
        assert_eq!(r.evaluate_guess(guesser, "caterpillar"), GuessOutcome::Incorrect);
        assert_eq!(r.evaluate_guess(guesser, "ca"), GuessOutcome::Incorrect);
    }

    #[tokio::test(start_paused = true)]
    async fn test_guess_from_stranger_is_unknown() {
        let (mut r, _rxs, _) = playing_room();
        assert_eq!(r.evaluate_guess(PlayerId(99), "cat"), GuessOutcome::UnknownPlayer);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_guess_after_end_round() {
        let (mut r, _rxs, start) = playing_room();
        assert_eq!(r.end_round().as_deref(), Some("cat"));
        assert_eq!(r.end_round(), None);
        assert_eq!(r.state(), RoomState::RoundEnded);
        let guesser = other(start.drawer_id);
        assert_eq!(r.evaluate_guess(guesser, "cat"), GuessOutcome::NoActiveRound);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_guessed_ignores_drawer() {
        let (mut r, _rxs, start) = playing_room();
        assert!(!r.all_guessed());
        r.check_guess(other(start.drawer_id), "cat");
        assert!(r.all_guessed());
    }

    // -- drawer departure ----------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn test_drawer_leaving_ends_round_and_clears_drawer() {
        let (mut r, _rxs, start) = playing_room();
        let departure = r.leave(start.drawer_id).unwrap();
        assert_eq!(departure.revealed_word.as_deref(), Some("cat"));
        assert_eq!(r.current_drawer(), None);
        assert_eq!(r.state(), RoomState::RoundEnded);

        let guesser = other(start.drawer_id);
        assert_eq!(r.evaluate_guess(guesser, "cat"), GuessOutcome::NoActiveRound);
        assert_eq!(r.player(guesser).unwrap().score, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_round_recoverable_after_drawer_left() {
        let (mut r, _rxs, start) = playing_room();
        let remaining = other(start.drawer_id);
        r.leave(start.drawer_id);
        let _c = add(&mut r, 3, "Cy");
        let mut rng = StdRng::seed_from_u64(5);
        let next = r.start_round(&cat_words(), &mut rng).unwrap();
        assert_eq!(next.round_number, 2);
        assert!(next.drawer_id == remaining || next.drawer_id == PlayerId(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_guesser_leaving_keeps_round() {
        let (mut r, _rxs, start) = playing_room();
        let departure = r.leave(other(start.drawer_id)).unwrap();
        assert!(departure.revealed_word.is_none());
        assert!(r.game().unwrap().is_round_active());
    }

    // -- end game / dispatch -------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn test_end_game_keeps_scores() {
        let (mut r, _rxs, start) = playing_room();
        let guesser = other(start.drawer_id);
        r.check_guess(guesser, "cat");
        r.end_round();
        r.end_game();
        assert_eq!(r.state(), RoomState::Waiting);
        assert!(r.game().is_none());
        assert_eq!(r.player(guesser).unwrap().score, 100);
        assert!(r.players().iter().all(|p| !p.is_drawer));
    }

    #[test]
    fn test_dispatch_resolves_recipients() {
        let mut r = room();
        let mut a = add(&mut r, 1, "A");
        let mut b = add(&mut r, 2, "B");
        r.dispatch(vec![
            (Recipient::All, ServerEvent::TimerUpdate { seconds: 5 }),
            (Recipient::Player(PlayerId(1)), ServerEvent::Pong),
            (Recipient::AllExcept(PlayerId(1)), ServerEvent::error("hi")),
        ]);

        assert_eq!(a.try_recv().unwrap(), ServerEvent::TimerUpdate { seconds: 5 });
        assert_eq!(a.try_recv().unwrap(), ServerEvent::Pong);
        assert!(a.try_recv().is_err());

        assert_eq!(b.try_recv().unwrap(), ServerEvent::TimerUpdate { seconds: 5 });
        assert_eq!(b.try_recv().unwrap(), ServerEvent::error("hi"));
        assert!(b.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_round_skips_disconnected_members() {
        let mut r = room();
        let _a = add(&mut r, 1, "A");
        let b = add(&mut r, 2, "B");
        let _c = add(&mut r, 3, "C");
        drop(b);
        r.dispatch(vec![(Recipient::All, ServerEvent::Pong)]);
        r.start_game().unwrap();

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let start = r.start_round(&cat_words(), &mut rng).unwrap();
            assert_ne!(start.drawer_id, PlayerId(2));
            r.end_round();
        }
    }

    #[test]
    fn test_dispatch_marks_closed_channel_disconnected() {
        let mut r = room();
        let _a = add(&mut r, 1, "A");
        let b = add(&mut r, 2, "B");
        drop(b);
        r.dispatch(vec![(Recipient::All, ServerEvent::Pong)]);
        assert!(r.player(PlayerId(1)).unwrap().connected);
        assert!(!r.player(PlayerId(2)).unwrap().connected);
        assert_eq!(r.connected_count(), 1);
    }
}
