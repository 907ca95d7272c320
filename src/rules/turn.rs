//! Turn state machine.
//!
//! Every function here takes a `GameState` by reference and returns a new
//! one; the input is never modified, so the caller can keep it as an undo
//! snapshot.
//!
//! ## Transitions on a roll
//!
//! 1. Validate against the active player's active frame.
//! 2. Append the roll.
//! 3. If the frame still takes a roll, the same player rolls again.
//! 4. Otherwise the next player in roster order is up; wrapping to the first
//!    player completes a round and moves play to the next frame.
//! 5. In frame 10, once every player's tenth frame is complete the game is
//!    `Finished`.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::core::{Frame, GameState, Player, PlayerId, Roll, Turn, FRAME_COUNT};
use crate::error::BowlingError;

use super::validator;

fn tenth_complete(state: &GameState, id: &PlayerId) -> bool {
    state
        .frames(id)
        .and_then(|frames| frames.last())
        .is_some_and(validator::is_complete)
}

/// Whether every rostered player has completed frame 10.
#[must_use]
pub fn all_players_done(state: &GameState) -> bool {
    !state.players.is_empty() && state.players.iter().all(|p| tenth_complete(state, &p.id))
}

/// Hand the turn to the roster position `candidate` in `frame`.
///
/// `candidate == players.len()` means the round wrapped. In frame 10,
/// players who have already finished are skipped.
fn hand_over(state: &GameState, candidate: usize, frame: u8) -> Turn {
    let count = state.players.len();
    if count == 0 {
        return Turn::NoPlayers { frame };
    }

    if frame >= FRAME_COUNT {
        if all_players_done(state) {
            return Turn::Finished;
        }
        return (0..count)
            .map(|offset| &state.players[(candidate + offset) % count])
            .find(|p| !tenth_complete(state, &p.id))
            .map_or(Turn::Finished, |p| Turn::AwaitingRoll {
                player: p.id.clone(),
                frame: FRAME_COUNT,
            });
    }

    if candidate >= count {
        Turn::AwaitingRoll {
            player: state.players[0].id.clone(),
            frame: frame + 1,
        }
    } else {
        Turn::AwaitingRoll {
            player: state.players[candidate].id.clone(),
            frame,
        }
    }
}

/// Apply a roll by the active player.
///
/// Fails with `GameFinished`, `NoActivePlayer`, or `InvalidRoll` without
/// producing a new state.
pub fn apply_roll(state: &GameState, pins: u8, now: DateTime<Utc>) -> Result<GameState, BowlingError> {
    let (player, frame) = match &state.turn {
        Turn::Finished => return Err(BowlingError::GameFinished),
        Turn::NoPlayers { .. } => return Err(BowlingError::NoActivePlayer),
        Turn::AwaitingRoll { player, frame } => (player, *frame),
    };

    let index = state
        .player_index(player)
        .ok_or(BowlingError::NoActivePlayer)?;
    let frames = state.frames(player).ok_or(BowlingError::NoActivePlayer)?;
    let position = usize::from(frame.clamp(1, FRAME_COUNT) - 1);
    let current = frames.get(position).ok_or(BowlingError::NoActivePlayer)?;

    validator::validate(current, pins)?;

    let updated: Frame = current.with_roll(Roll::new(pins, now));
    let frame_done = validator::is_complete(&updated);

    let mut next = state.clone();
    next.player_frames
        .insert(player.clone(), frames.update(position, updated));
    next.updated_at = Some(now);

    if frame_done {
        next.turn = hand_over(&next, index + 1, frame);
    }

    debug!(
        player = %player,
        frame,
        pins,
        frame_done,
        turn = ?next.turn,
        "roll applied"
    );
    Ok(next)
}

/// Add `player` to the roster, or replace the entry with the same id in
/// place.
///
/// A new player gets ten empty frames and joins at the back of the turn
/// order. Existing frames are untouched. An empty or finished game resumes
/// with the new player.
#[must_use]
pub fn add_player(state: &GameState, player: Player, now: DateTime<Utc>) -> GameState {
    let mut next = state.clone();
    next.updated_at = Some(now);

    if let Some(index) = state.player_index(&player.id) {
        next.players = next.players.update(index, player);
        return next;
    }

    next.player_frames
        .insert(player.id.clone(), Frame::empty_set());
    next.turn = match &state.turn {
        Turn::NoPlayers { frame } => Turn::AwaitingRoll {
            player: player.id.clone(),
            frame: *frame,
        },
        Turn::Finished => Turn::AwaitingRoll {
            player: player.id.clone(),
            frame: FRAME_COUNT,
        },
        awaiting @ Turn::AwaitingRoll { .. } => awaiting.clone(),
    };
    next.players.push_back(player);
    next
}

/// Remove a player and their frames.
///
/// If the removed player held the turn, it passes to the player who
/// followed them.
pub fn remove_player(state: &GameState, id: &PlayerId, now: DateTime<Utc>) -> Result<GameState, BowlingError> {
    let index = state
        .player_index(id)
        .ok_or_else(|| BowlingError::UnknownPlayer { id: id.clone() })?;

    let mut next = state.clone();
    next.players.remove(index);
    next.player_frames.remove(id);
    next.updated_at = Some(now);

    next.turn = match &state.turn {
        _ if next.players.is_empty() => Turn::NoPlayers {
            frame: state.turn.frame().unwrap_or(FRAME_COUNT),
        },
        Turn::AwaitingRoll { player, frame } if player == id => hand_over(&next, index, *frame),
        Turn::AwaitingRoll { frame, .. } if *frame >= FRAME_COUNT && all_players_done(&next) => {
            Turn::Finished
        }
        other => other.clone(),
    };

    debug!(player = %id, turn = ?next.turn, "player removed");
    Ok(next)
}

/// Rebuild a consistent turn from loosely-typed legacy fields.
///
/// Used when migrating stored games that only recorded a current player id
/// and frame index.
#[must_use]
pub fn resume(state: &GameState, player: Option<&PlayerId>, frame: u8) -> Turn {
    let frame = frame.clamp(1, FRAME_COUNT);
    if state.players.is_empty() {
        return Turn::NoPlayers { frame };
    }
    if all_players_done(state) {
        return Turn::Finished;
    }
    let Some((index, id)) = player.and_then(|id| state.player_index(id).map(|i| (i, id))) else {
        return hand_over(state, 0, frame);
    };
    let frame_done = state
        .frames(id)
        .and_then(|frames| frames.get(usize::from(frame - 1)))
        .is_some_and(validator::is_complete);
    if frame_done {
        hand_over(state, index + 1, frame)
    } else {
        hand_over(state, index, frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GameId;
    use im::Vector;

    fn start(names: &[&str]) -> GameState {
        let now = Utc::now();
        let players: Vector<Player> = names
            .iter()
            .map(|n| Player::new(PlayerId::new(*n), *n, now))
            .collect();
        GameState::new(GameId::new("g"), players, now)
    }

    fn roll_all(state: GameState, pins: &[u8]) -> GameState {
        pins.iter()
            .fold(state, |s, &p| apply_roll(&s, p, Utc::now()).unwrap())
    }

    fn awaiting(player: &str, frame: u8) -> Turn {
        Turn::AwaitingRoll {
            player: PlayerId::new(player),
            frame,
        }
    }

    #[test]
    fn test_same_player_rolls_twice() {
        let state = roll_all(start(&["a", "b"]), &[3]);
        assert_eq!(state.turn, awaiting("a", 1));
    }

    #[test]
    fn test_turn_passes_after_open_frame() {
        let state = roll_all(start(&["a", "b"]), &[3, 4]);
        assert_eq!(state.turn, awaiting("b", 1));
    }

    #[test]
    fn test_strike_ends_turn() {
        let state = roll_all(start(&["a", "b"]), &[10]);
        assert_eq!(state.turn, awaiting("b", 1));
    }

    #[test]
    fn test_round_advances_frame() {
        let state = roll_all(start(&["a", "b"]), &[10, 10]);
        assert_eq!(state.turn, awaiting("a", 2));
    }

    #[test]
    fn test_single_player_advances_each_frame() {
        let state = roll_all(start(&["solo"]), &[1, 2, 10]);
        assert_eq!(state.turn, awaiting("solo", 3));
    }

    #[test]
    fn test_input_state_untouched() {
        let before = start(&["a"]);
        let after = apply_roll(&before, 7, Utc::now()).unwrap();

        assert!(before.frames(&PlayerId::new("a")).unwrap()[0].is_empty());
        assert_eq!(after.frames(&PlayerId::new("a")).unwrap()[0].roll_count(), 1);
    }

    #[test]
    fn test_invalid_roll_rejected() {
        let state = roll_all(start(&["a"]), &[6]);
        let err = apply_roll(&state, 5, Utc::now()).unwrap_err();
        assert!(err.is_invalid_roll());
    }

    #[test]
    fn test_perfect_game_finishes() {
        let state = roll_all(start(&["a"]), &[10; 12]);
        assert_eq!(state.turn, Turn::Finished);
        assert_eq!(
            apply_roll(&state, 0, Utc::now()).unwrap_err(),
            BowlingError::GameFinished
        );
    }

    #[test]
    fn test_tenth_frame_bonus_keeps_player() {
        let state = roll_all(start(&["a", "b"]), &[0; 36]);
        assert_eq!(state.turn, awaiting("a", 10));

        let state = roll_all(state, &[7, 3]);
        assert_eq!(state.turn, awaiting("a", 10));

        let state = roll_all(state, &[5]);
        assert_eq!(state.turn, awaiting("b", 10));

        let state = roll_all(state, &[1, 1]);
        assert_eq!(state.turn, Turn::Finished);
    }

    #[test]
    fn test_no_players() {
        let state = GameState::new(GameId::new("g"), Vector::new(), Utc::now());
        assert_eq!(
            apply_roll(&state, 3, Utc::now()).unwrap_err(),
            BowlingError::NoActivePlayer
        );
    }

    #[test]
    fn test_add_player_keeps_progress() {
        let state = roll_all(start(&["a", "b"]), &[10, 3]);
        let now = Utc::now();
        let next = add_player(&state, Player::new(PlayerId::new("c"), "c", now), now);

        assert_eq!(next.players.len(), 3);
        assert_eq!(next.frames(&PlayerId::new("a")), state.frames(&PlayerId::new("a")));
        assert_eq!(next.frames(&PlayerId::new("b")), state.frames(&PlayerId::new("b")));
        assert_eq!(next.turn, state.turn);

        // b finishes the frame, then c is up in the same frame
        let next = roll_all(next, &[2]);
        assert_eq!(next.turn, awaiting("c", 1));
    }

    #[test]
    fn test_add_player_replaces_in_place() {
        let state = roll_all(start(&["a", "b"]), &[4]);
        let now = Utc::now();
        let next = add_player(&state, Player::new(PlayerId::new("a"), "Alice", now), now);

        assert_eq!(next.players.len(), 2);
        assert_eq!(next.players[0].name, "Alice");
        assert_eq!(next.frames(&PlayerId::new("a")), state.frames(&PlayerId::new("a")));
    }

    #[test]
    fn test_add_player_to_finished_game() {
        let state = roll_all(start(&["a"]), &[0; 20]);
        assert!(state.is_finished());

        let now = Utc::now();
        let next = add_player(&state, Player::new(PlayerId::new("b"), "b", now), now);
        assert_eq!(next.turn, awaiting("b", 10));
    }

    #[test]
    fn test_remove_current_player_passes_turn() {
        let state = roll_all(start(&["a", "b", "c"]), &[5]);
        let next = remove_player(&state, &PlayerId::new("a"), Utc::now()).unwrap();
        assert_eq!(next.turn, awaiting("b", 1));
        assert!(next.frames(&PlayerId::new("a")).is_none());
    }

    #[test]
    fn test_remove_last_in_order_wraps_round() {
        let state = roll_all(start(&["a", "b"]), &[10]);
        assert_eq!(state.turn, awaiting("b", 1));

        let next = remove_player(&state, &PlayerId::new("b"), Utc::now()).unwrap();
        assert_eq!(next.turn, awaiting("a", 2));
    }

    #[test]
    fn test_remove_other_player_keeps_turn() {
        let state = start(&["a", "b"]);
        let next = remove_player(&state, &PlayerId::new("b"), Utc::now()).unwrap();
        assert_eq!(next.turn, awaiting("a", 1));
    }

    #[test]
    fn test_remove_everyone() {
        let state = roll_all(start(&["a"]), &[10, 10]);
        let next = remove_player(&state, &PlayerId::new("a"), Utc::now()).unwrap();
        assert_eq!(next.turn, Turn::NoPlayers { frame: 3 });

        let now = Utc::now();
        let next = add_player(&next, Player::new(PlayerId::new("z"), "z", now), now);
        assert_eq!(next.turn, awaiting("z", 3));
    }

    #[test]
    fn test_remove_unknown_player() {
        let err = remove_player(&start(&["a"]), &PlayerId::new("x"), Utc::now()).unwrap_err();
        assert_eq!(err, BowlingError::UnknownPlayer { id: PlayerId::new("x") });
    }

    #[test]
    fn test_remove_unfinished_player_finishes_game() {
        let state = roll_all(start(&["a", "b"]), &[0; 38]);
        assert_eq!(state.turn, awaiting("b", 10));

        let next = remove_player(&state, &PlayerId::new("b"), Utc::now()).unwrap();
        assert_eq!(next.turn, Turn::Finished);
    }

    #[test]
    fn test_resume_from_legacy_fields() {
        let state = start(&["a", "b"]);
        assert_eq!(resume(&state, Some(&PlayerId::new("b")), 4), awaiting("b", 4));
        assert_eq!(resume(&state, Some(&PlayerId::new("gone")), 4), awaiting("a", 4));
        assert_eq!(resume(&state, None, 0), awaiting("a", 1));
    }

    #[test]
    fn test_resume_skips_completed_frame() {
        let state = roll_all(start(&["a", "b"]), &[10]);
        assert_eq!(resume(&state, Some(&PlayerId::new("a")), 1), awaiting("b", 1));
    }
}
