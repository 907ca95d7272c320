//! Undo history.
//!
//! A `Snapshot` is a retained earlier `GameState`. Because game states are
//! built from `im` persistent collections and never mutated in place, a
//! snapshot shares structure with the live game yet cannot observe later
//! changes to it.
//!
//! History is kept on the `Game`, next to the state, and never inside a
//! snapshot. Undo pops the newest snapshot and makes its state current,
//! keeping the rest of the history, so repeated undo walks backward one
//! mutation at a time. There is no redo.
//!
//! ## Example
//!
//! ```
//! use bowling_engine::core::{Game, GameId, GameState};
//! use bowling_engine::undo::UndoManager;
//! use chrono::Utc;
//!
//! let undo = UndoManager::new();
//! let game = Game::new(GameState::new(GameId::new("g"), Default::default(), Utc::now()));
//!
//! assert!(undo.undo(&game).is_none());
//!
//! let snapped = undo.snapshot(&game, Utc::now());
//! assert_eq!(snapped.undo_depth(), 1);
//! let restored = undo.undo(&snapped).unwrap();
//! assert_eq!(restored, game);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{Game, GameState};

/// A prior game state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// When the snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// The state immediately before the mutation that followed.
    pub state: GameState,
}

/// Pushes and pops snapshots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UndoManager {
    max_depth: Option<usize>,
}

impl UndoManager {
    /// Unbounded history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// History capped at `max_depth` snapshots (oldest dropped first).
    #[must_use]
    pub fn with_max_depth(max_depth: Option<usize>) -> Self {
        Self { max_depth }
    }

    /// Configured cap.
    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Return `game` with its current state pushed onto its history.
    #[must_use]
    pub fn snapshot(&self, game: &Game, now: DateTime<Utc>) -> Game {
        let mut next = game.clone();
        next.undo_stack.push_back(Snapshot {
            timestamp: now,
            state: game.state.clone(),
        });

        if let Some(max) = self.max_depth {
            while next.undo_stack.len() > max {
                next.undo_stack.pop_front();
            }
        }

        trace!(game = %game.id(), depth = next.undo_stack.len(), "snapshot pushed");
        next
    }

    /// Snapshot `game`, then make `state` current.
    #[must_use]
    pub fn commit(&self, game: &Game, state: GameState, now: DateTime<Utc>) -> Game {
        let mut next = self.snapshot(game, now);
        next.state = state;
        next
    }

    /// Restore the newest snapshot, or `None` if there is no history.
    #[must_use]
    pub fn undo(&self, game: &Game) -> Option<Game> {
        let mut undo_stack = game.undo_stack.clone();
        let snapshot = undo_stack.pop_back()?;

        trace!(game = %game.id(), depth = undo_stack.len(), "snapshot restored");
        Some(Game {
            state: snapshot.state,
            undo_stack,
        })
    }
}
