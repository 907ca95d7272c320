//! Best-effort recovery of stored games.
//!
//! Handles the current layout, the flat legacy layout, and partially
//! damaged documents of either. Rolls are replayed through the validator,
//! so a recovered game never holds an illegal frame; the first illegal roll
//! in a frame and everything after it in that frame are discarded.

use chrono::{DateTime, Utc};
use im::{OrdMap, Vector};
use rustc_hash::FxHashSet;
use serde_json::Value;

use crate::core::{Frame, Game, GameId, GameState, NewPlayer, Player, PlayerId, Roll, Turn, FRAME_COUNT};
use crate::rules::{turn, validator};
use crate::undo::Snapshot;

/// Ids were strings in one legacy client and integers in another.
pub(super) fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_time(value: &Value) -> Option<DateTime<Utc>> {
    value.as_str()?.parse().ok()
}

fn frame_number(value: Option<&Value>) -> Option<u8> {
    value
        .and_then(Value::as_u64)
        .and_then(|n| u8::try_from(n).ok())
}

/// Replay `(frame index, rolls)` pairs onto ten fresh frames.
fn rebuild_frames<I>(frames: I) -> Vector<Frame>
where
    I: IntoIterator<Item = (u8, Vec<Roll>)>,
{
    let mut rebuilt = Frame::empty_set();
    for (index, rolls) in frames {
        if !(1..=FRAME_COUNT).contains(&index) {
            continue;
        }
        let position = usize::from(index - 1);
        if !rebuilt[position].is_empty() {
            continue;
        }
        let mut frame = Frame::new(index);
        for roll in rolls {
            if validator::validate(&frame, roll.pins).is_err() {
                break;
            }
            frame = frame.with_roll(roll);
        }
        rebuilt[position] = frame;
    }
    rebuilt
}

fn decode_roll(value: &Value, fallback: DateTime<Utc>) -> Option<Roll> {
    let pins = match value {
        Value::Object(obj) => frame_number(obj.get("pins"))?,
        other => frame_number(Some(other))?,
    };
    let timestamp = value
        .get("timestamp")
        .and_then(parse_time)
        .unwrap_or(fallback);
    Some(Roll::new(pins, timestamp))
}

fn decode_frames(value: Option<&Value>, fallback: DateTime<Utc>) -> Vector<Frame> {
    let entries = value.and_then(Value::as_array).cloned().unwrap_or_default();
    rebuild_frames(entries.iter().enumerate().filter_map(|(position, entry)| {
        let index = frame_number(entry.get("index")).or_else(|| u8::try_from(position + 1).ok())?;
        let rolls = entry
            .get("rolls")
            .and_then(Value::as_array)
            .map(|rolls| rolls.iter().map_while(|r| decode_roll(r, fallback)).collect::<Vec<_>>())
            .unwrap_or_default();
        Some((index, rolls))
    }))
}

fn decode_players(value: Option<&Value>, fallback: DateTime<Utc>) -> Vector<Player> {
    let mut seen = FxHashSet::default();
    let mut players = Vector::new();
    for entry in value.and_then(Value::as_array).into_iter().flatten() {
        let Some(id) = entry.get("id").and_then(id_string) else {
            continue;
        };
        if !seen.insert(id.clone()) {
            continue;
        }
        let requested = entry.get("name").and_then(Value::as_str).unwrap_or_default();
        let name = NewPlayer::named(requested).display_name(players.len());
        let created_at = entry
            .get("createdAt")
            .and_then(parse_time)
            .unwrap_or(fallback);
        players.push_back(Player::new(PlayerId::new(id), name, created_at));
    }
    players
}

/// Where the stored turn pointed, from either layout.
fn turn_hint(obj: &serde_json::Map<String, Value>) -> (Option<PlayerId>, u8) {
    if let Some(turn) = obj
        .get("turn")
        .and_then(|t| serde_json::from_value::<Turn>(t.clone()).ok())
    {
        return (turn.player().cloned(), turn.frame().unwrap_or(FRAME_COUNT));
    }
    let player = obj
        .get("currentPlayerId")
        .and_then(id_string)
        .map(PlayerId::new);
    let frame = frame_number(obj.get("currentFrameIndex")).unwrap_or(1);
    (player, frame)
}

fn decode_state(value: &Value) -> Option<GameState> {
    if let Ok(state) = serde_json::from_value::<GameState>(value.clone()) {
        return Some(state);
    }

    let obj = value.as_object()?;
    let id = obj.get("id").and_then(id_string).map(GameId::new)?;
    let created_at = obj
        .get("createdAt")
        .and_then(parse_time)
        .unwrap_or_default();
    let players = decode_players(obj.get("players"), created_at);
    let frames_by_player = obj.get("playerFrames");
    let player_frames: OrdMap<PlayerId, Vector<Frame>> = players
        .iter()
        .map(|p| {
            let raw = frames_by_player.and_then(|m| m.get(p.id.as_str()));
            (p.id.clone(), decode_frames(raw, created_at))
        })
        .collect();

    let mut state = GameState {
        id,
        players,
        player_frames,
        turn: Turn::NoPlayers { frame: 1 },
        created_at,
        updated_at: obj.get("updatedAt").and_then(parse_time),
    };
    let (player, frame) = turn_hint(obj);
    state.turn = turn::resume(&state, player.as_ref(), frame);
    Some(state)
}

fn decode_snapshot(value: &Value) -> Option<Snapshot> {
    let state = decode_state(value.get("state")?)?;
    let timestamp = value
        .get("timestamp")
        .and_then(parse_time)
        .unwrap_or_else(|| state.updated_at.unwrap_or(state.created_at));
    Some(Snapshot { timestamp, state })
}

/// Decode one stored game in whatever layout it was written.
pub(super) fn decode_game(value: &Value) -> Option<Game> {
    if let Ok(game) = serde_json::from_value::<Game>(value.clone()) {
        return Some(game);
    }

    let obj = value.as_object()?;
    let state_value = obj.get("state").filter(|s| s.is_object()).unwrap_or(value);
    let state = decode_state(state_value)?;
    let undo_stack = obj
        .get("undoStack")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().filter_map(decode_snapshot).collect())
        .unwrap_or_default();

    Some(Game { state, undo_stack })
}

fn turn_is_consistent(state: &GameState) -> bool {
    match &state.turn {
        Turn::AwaitingRoll { player, frame } => {
            (1..=FRAME_COUNT).contains(frame)
                && state
                    .frames(player)
                    .and_then(|frames| frames.get(usize::from(*frame - 1)))
                    .is_some_and(|f| !validator::is_complete(f))
        }
        Turn::Finished => turn::all_players_done(state),
        Turn::NoPlayers { frame } => state.players.is_empty() && (1..=FRAME_COUNT).contains(frame),
    }
}

fn repair_state(state: GameState) -> GameState {
    let mut seen = FxHashSet::default();
    let players: Vector<Player> = state
        .players
        .iter()
        .filter(|p| seen.insert(p.id.clone()))
        .cloned()
        .collect();

    let player_frames = players
        .iter()
        .map(|p| {
            let stored = state.frames(&p.id).cloned().unwrap_or_default();
            let frames = rebuild_frames(
                stored
                    .iter()
                    .map(|f| (f.index, f.rolls.iter().copied().collect::<Vec<_>>())),
            );
            (p.id.clone(), frames)
        })
        .collect();

    let mut repaired = GameState {
        players,
        player_frames,
        ..state
    };
    if !turn_is_consistent(&repaired) {
        let player = repaired.turn.player().cloned();
        let frame = repaired.turn.frame().unwrap_or(FRAME_COUNT);
        repaired.turn = turn::resume(&repaired, player.as_ref(), frame);
    }
    repaired
}

/// Restore the game invariants: unique roster ids, exactly ten legal frames
/// per rostered player, and a turn that points at someone who can roll.
pub(super) fn repair(game: Game) -> Game {
    Game {
        state: repair_state(game.state),
        undo_stack: game
            .undo_stack
            .into_iter()
            .map(|snapshot| Snapshot {
                timestamp: snapshot.timestamp,
                state: repair_state(snapshot.state),
            })
            .collect(),
    }
}
