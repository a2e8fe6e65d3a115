//! Builders for the event batches that several code paths send.

use scribble_protocol::{CorrectGuess, PlayerId, Recipient, RoundStarted, ServerEvent};

use crate::{Room, RoundStart};

/// `round_started`: the word to the drawer, the guesser variant to
/// everybody else.
pub(crate) fn round_started(start: &RoundStart) -> Vec<(Recipient, ServerEvent)> {
    let payload = |is_drawer: bool| RoundStarted {
        is_drawer,
        word: is_drawer.then(|| start.word.clone()),
        seconds: start.seconds,
        round_number: start.round_number,
        drawer_id: start.drawer_id,
        drawer_name: start.drawer_name.clone(),
    };
    vec![
        (
            Recipient::Player(start.drawer_id),
            ServerEvent::RoundStarted(payload(true)),
        ),
        (
            Recipient::AllExcept(start.drawer_id),
            ServerEvent::RoundStarted(payload(false)),
        ),
    ]
}

/// `correct_guess` to every member (with the word only for the guesser
/// and the drawer), followed by `scores_updated`.
pub(crate) fn correct_guess(
    room: &Room,
    guesser: PlayerId,
    drawer: Option<PlayerId>,
    word: &str,
) -> Vec<(Recipient, ServerEvent)> {
    let player_name = room
        .player(guesser)
        .map(|p| p.name.clone())
        .unwrap_or_default();

    let mut events: Vec<_> = room
        .players()
        .iter()
        .map(|member| {
            let knows_word = member.id == guesser || Some(member.id) == drawer;
            (
                Recipient::Player(member.id),
                ServerEvent::CorrectGuess(CorrectGuess {
                    player_id: guesser,
                    player_name: player_name.clone(),
                    word: knows_word.then(|| word.to_string()),
                }),
            )
        })
        .collect();
    events.push(scores_updated(room));
    events
}

/// `round_ended` with the revealed word, followed by `scores_updated`.
pub(crate) fn round_ended(room: &Room, word: String) -> Vec<(Recipient, ServerEvent)> {
    vec![
        (Recipient::All, ServerEvent::RoundEnded { word }),
        scores_updated(room),
    ]
}

pub(crate) fn scores_updated(room: &Room) -> (Recipient, ServerEvent) {
    (
        Recipient::All,
        ServerEvent::ScoresUpdated {
            players: room.views(),
        },
    )
}
