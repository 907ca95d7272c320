//! Game state values.
//!
//! ## GameState
//!
//! Everything needed to continue a game:
//! - Roster in turn order
//! - Ten frames per player
//! - Whose turn it is (`Turn`)
//! - Timestamps
//!
//! ## Game
//!
//! A `GameState` plus its undo history. Snapshots in the history hold only
//! a `GameState`, so history is never nested inside history.
//!
//! Both use `im` persistent collections: a mutation builds a new value that
//! shares unchanged structure with the old one, and the old value stays
//! valid as a snapshot.

use chrono::{DateTime, Utc};
use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};

use super::frame::Frame;
use super::player::{Player, PlayerId};
use crate::undo::Snapshot;

/// Opaque game identifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    /// Create a game ID from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GameId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Whose turn it is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Turn {
    /// `player` rolls next, in frame `frame` (1..=10).
    #[serde(rename_all = "camelCase")]
    AwaitingRoll {
        /// The active player.
        player: PlayerId,
        /// The active frame.
        frame: u8,
    },

    /// Every player has completed frame 10.
    Finished,

    /// The roster is empty. `frame` is where play resumes once a player
    /// joins.
    NoPlayers {
        /// The frame play was in.
        frame: u8,
    },
}

impl Turn {
    /// Active player, if any.
    #[must_use]
    pub fn player(&self) -> Option<&PlayerId> {
        match self {
            Turn::AwaitingRoll { player, .. } => Some(player),
            Turn::Finished | Turn::NoPlayers { .. } => None,
        }
    }

    /// Active frame, or `None` once finished.
    #[must_use]
    pub fn frame(&self) -> Option<u8> {
        match self {
            Turn::AwaitingRoll { frame, .. } | Turn::NoPlayers { frame } => Some(*frame),
            Turn::Finished => None,
        }
    }

    /// Whether the game is over.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self, Turn::Finished)
    }
}

/// Playable state of one game, without undo history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Game identifier.
    pub id: GameId,

    /// Roster; list order is turn order.
    #[serde(default)]
    pub players: Vector<Player>,

    /// Ten frames per rostered player, frame `i` at position `i - 1`.
    #[serde(default)]
    pub player_frames: OrdMap<PlayerId, Vector<Frame>>,

    /// Turn state machine position.
    pub turn: Turn,

    /// When the game was started.
    #[serde(default)]
    pub created_at: DateTime<Utc>,

    /// When the game last changed.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl GameState {
    /// A fresh game: ten empty frames per player, first player up in frame 1.
    #[must_use]
    pub fn new(id: GameId, players: Vector<Player>, now: DateTime<Utc>) -> Self {
        let player_frames = players
            .iter()
            .map(|p| (p.id.clone(), Frame::empty_set()))
            .collect();

        let turn = match players.front() {
            Some(first) => Turn::AwaitingRoll {
                player: first.id.clone(),
                frame: 1,
            },
            None => Turn::NoPlayers { frame: 1 },
        };

        Self {
            id,
            players,
            player_frames,
            turn,
            created_at: now,
            updated_at: None,
        }
    }

    /// Number of rostered players.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Position of a player in turn order.
    #[must_use]
    pub fn player_index(&self, id: &PlayerId) -> Option<usize> {
        self.players.iter().position(|p| &p.id == id)
    }

    /// Look up a roster entry.
    #[must_use]
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    /// A player's ten frames.
    #[must_use]
    pub fn frames(&self, id: &PlayerId) -> Option<&Vector<Frame>> {
        self.player_frames.get(id)
    }

    /// Player who rolls next.
    #[must_use]
    pub fn current_player_id(&self) -> Option<&PlayerId> {
        self.turn.player()
    }

    /// Frame in play (`None` once finished).
    #[must_use]
    pub fn current_frame_index(&self) -> Option<u8> {
        self.turn.frame()
    }

    /// Whether the game accepts no more rolls.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.turn.is_finished()
    }
}

/// A game together with its undo history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    /// Current state.
    pub state: GameState,

    /// Prior states, oldest first.
    #[serde(default)]
    pub undo_stack: Vector<Snapshot>,
}

impl Game {
    /// Wrap a state with an empty history.
    #[must_use]
    pub fn new(state: GameState) -> Self {
        Self {
            state,
            undo_stack: Vector::new(),
        }
    }

    /// Game identifier.
    #[must_use]
    pub fn id(&self) -> &GameId {
        &self.state.id
    }

    /// Roster in turn order.
    #[must_use]
    pub fn players(&self) -> &Vector<Player> {
        &self.state.players
    }

    /// Turn state.
    #[must_use]
    pub fn turn(&self) -> &Turn {
        &self.state.turn
    }

    /// Number of undo steps available.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }
}
