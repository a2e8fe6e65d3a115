//! The round clock: one background task per playing room.
//!
//! The task holds only a `Weak` reference to its room and a
//! [`CancelToken`] from the room's timer slot. It stops when the token is
//! cancelled (room closed or game ended), when the room is gone, or when
//! the game runs out of rounds or players.

use std::sync::{Arc, Weak};

use scribble_protocol::{Recipient, ServerEvent};
use scribble_tick::{CancelToken, Countdown};
use scribble_words::WordList;
use tokio::sync::Mutex;

use crate::{Room, events};

enum RoundEnd {
    /// The round finished (by timer, by all guessing, or elsewhere).
    Finished,
    /// Stop the clock entirely.
    Stop,
}

/// Drives a room from the round that is active now until the game ends.
pub(crate) async fn run_game_clock(
    room: Weak<Mutex<Room>>,
    mut token: CancelToken,
    words: Arc<WordList>,
) {
    loop {
        let Some((round, seconds, intermission)) = active_round(&room).await else {
            return;
        };

        if let RoundEnd::Stop = run_round(&room, &mut token, round, seconds).await {
            return;
        }

        tokio::select! {
            _ = token.cancelled() => return,
            _ = tokio::time::sleep(intermission) => {}
        }

        if !next_round(&room, &words).await {
            return;
        }
    }
}

/// Reads the current round number and the timings, or `None` if there is
/// nothing to time.
async fn active_round(
    room: &Weak<Mutex<Room>>,
) -> Option<(u32, u32, std::time::Duration)> {
    let arc = room.upgrade()?;
    let guard = arc.lock().await;
    if guard.is_closed() {
        return None;
    }
    let game = guard.game()?;
    if !game.is_round_active() {
        return None;
    }
    Some((
        game.round_number(),
        guard.config().round_seconds,
        guard.config().intermission,
    ))
}

/// Counts one round down, broadcasting every second, and ends it exactly
/// once on zero or when everyone has guessed.
async fn run_round(
    room: &Weak<Mutex<Room>>,
    token: &mut CancelToken,
    round: u32,
    seconds: u32,
) -> RoundEnd {
    let mut countdown = Countdown::new(seconds);
    loop {
        let next = tokio::select! {
            _ = token.cancelled() => return RoundEnd::Stop,
            next = countdown.tick() => next,
        };

        let Some(arc) = room.upgrade() else {
            return RoundEnd::Stop;
        };
        let mut guard = arc.lock().await;
        if guard.is_closed() {
            return RoundEnd::Stop;
        }
        let Some(game) = guard.game() else {
            return RoundEnd::Stop;
        };
        if game.round_number() != round || !game.is_round_active() {
            // Ended elsewhere, e.g. the drawer left.
            return RoundEnd::Finished;
        }

        let remaining = next.unwrap_or(0);
        guard.update_timer(remaining);
        guard.dispatch(vec![(
            Recipient::All,
            ServerEvent::TimerUpdate { seconds: remaining },
        )]);

        let early = guard.config().end_when_all_guessed && guard.all_guessed();
        if remaining == 0 || early {
            if early {
                tracing::debug!(room = %guard.code(), round, "everyone guessed");
            }
            if let Some(word) = guard.end_round() {
                let batch = events::round_ended(&guard, word);
                guard.dispatch(batch);
            }
            return RoundEnd::Finished;
        }
    }
}

/// After the intermission: start the next round, or end the game. A
/// round that is already running is left as is.
/// Returns `false` when the clock should stop.
async fn next_round(room: &Weak<Mutex<Room>>, words: &WordList) -> bool {
    let Some(arc) = room.upgrade() else {
        return false;
    };
    let mut guard = arc.lock().await;
    if guard.is_closed() {
        return false;
    }
    let Some(game) = guard.game() else {
        return false;
    };
    if game.is_round_active() {
        // Started by hand during the intermission; time that one.
        tracing::debug!(room = %guard.code(), round = game.round_number(), "adopting running round");
        return true;
    }

    let completed = game.round_number();
    let out_of_rounds = guard.config().is_last_round(completed);
    let short_handed = guard.connected_count() < guard.config().min_players;
    if out_of_rounds || short_handed {
        tracing::info!(
            room = %guard.code(),
            rounds = completed,
            out_of_rounds,
            short_handed,
            "game over"
        );
        finish_game(&mut guard);
        return false;
    }

    let started = {
        let mut rng = rand::rng();
        guard.start_round(words, &mut rng)
    };
    match started {
        Ok(start) => {
            guard.dispatch(events::round_started(&start));
            true
        }
        Err(e) => {
            tracing::warn!(room = %guard.code(), error = %e, "could not start next round");
            guard.dispatch(vec![(Recipient::All, ServerEvent::error(e.to_string()))]);
            finish_game(&mut guard);
            false
        }
    }
}

fn finish_game(room: &mut Room) {
    let players = room.views();
    room.end_game();
    room.dispatch(vec![(Recipient::All, ServerEvent::GameEnded { players })]);
}
