//! Persisted document layout and version handling.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::core::{Game, GameId};

use super::migrate;
use super::StorageError;

/// Version written by this crate.
pub const CURRENT_VERSION: u32 = 2;

/// Flat layout: each game carried `currentPlayerId`/`currentFrameIndex` and
/// snapshots nested whole games, undo stacks included.
pub const LEGACY_VERSION: u32 = 1;

/// Everything a store holds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageSchema {
    /// Layout version.
    pub version: u32,

    /// Stored games, at most one per id.
    #[serde(default)]
    pub games: Vec<Game>,

    /// Game the engine resumes on startup.
    #[serde(default)]
    pub active_game_id: Option<GameId>,
}

impl Default for StorageSchema {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            games: Vec::new(),
            active_game_id: None,
        }
    }
}

impl StorageSchema {
    /// Look up a stored game.
    #[must_use]
    pub fn game(&self, id: &GameId) -> Option<&Game> {
        self.games.iter().find(|g| g.id() == id)
    }

    /// The game the active pointer refers to.
    #[must_use]
    pub fn active_game(&self) -> Option<&Game> {
        self.active_game_id.as_ref().and_then(|id| self.game(id))
    }

    /// Insert `game`, replacing a stored game with the same id in place.
    pub fn upsert(&mut self, game: Game) {
        match self.games.iter_mut().find(|g| g.id() == game.id()) {
            Some(slot) => *slot = game,
            None => self.games.push(game),
        }
    }

    /// Remove a game, clearing the active pointer if it pointed there.
    pub fn remove(&mut self, id: &GameId) -> Option<Game> {
        let position = self.games.iter().position(|g| g.id() == id)?;
        if self.active_game_id.as_ref() == Some(id) {
            self.active_game_id = None;
        }
        Some(self.games.remove(position))
    }

    /// Parse a stored JSON document. Only fails if the text is not JSON.
    pub fn from_json_str(text: &str) -> Result<Self, StorageError> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from_json_value(value))
    }

    /// Decode a stored document, migrating anything that is not exactly
    /// the current layout.
    ///
    /// Missing fields default to empty, games that cannot be recovered are
    /// dropped, and the active pointer is cleared if its game was dropped.
    #[must_use]
    pub fn from_json_value(value: Value) -> Self {
        let version = value
            .get("version")
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok());

        if version == Some(CURRENT_VERSION) {
            if let Ok(schema) = serde_json::from_value::<StorageSchema>(value.clone()) {
                return schema.normalized();
            }
            warn!("stored document does not match the current layout, recovering field by field");
        } else {
            info!(from = ?version, to = CURRENT_VERSION, "migrating stored games");
        }

        let games = value
            .get("games")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .enumerate()
                    .filter_map(|(position, entry)| {
                        let game = migrate::decode_game(entry);
                        if game.is_none() {
                            warn!(position, "dropping unreadable stored game");
                        }
                        game
                    })
                    .collect()
            })
            .unwrap_or_default();

        let active_game_id = value
            .get("activeGameId")
            .and_then(migrate::id_string)
            .map(GameId::new);

        Self {
            version: CURRENT_VERSION,
            games,
            active_game_id,
        }
        .normalized()
    }

    /// Enforce one game per id (last wins), repair every game's
    /// invariants, and drop a dangling active pointer.
    fn normalized(self) -> Self {
        let mut out = Self {
            version: CURRENT_VERSION,
            games: Vec::with_capacity(self.games.len()),
            active_game_id: None,
        };
        for game in self.games {
            out.upsert(migrate::repair(game));
        }
        out.active_game_id = self.active_game_id.filter(|id| out.game(id).is_some());
        out
    }
}
