//! Player identification and roster entries.
//!
//! ## PlayerId
//!
//! Opaque, caller-chosen (or generated) identifier. Turn order is the order
//! of the roster, never the order of ids.
//!
//! ## Player
//!
//! A roster entry: id, display name, and the time the player joined.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque player identifier.
///
/// Ordered so it can key the persistent per-player frame map.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Create a player ID from any string-like value.
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

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A player on a game's roster.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Stable identifier, unique within a game.
    pub id: PlayerId,

    /// Display name (never empty).
    pub name: String,

    /// When the player was added.
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

impl Player {
    /// Create a roster entry stamped with `created_at`.
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            created_at,
        }
    }
}

/// A player as supplied by a caller, before it joins a game.
///
/// The id is optional: the engine generates one when it is missing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPlayer {
    /// Caller-chosen id, if any.
    pub id: Option<PlayerId>,

    /// Requested display name. Blank names get a positional default.
    pub name: String,
}

impl NewPlayer {
    /// A player with an explicit id.
    #[must_use]
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
        }
    }

    /// A player whose id will be generated.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    /// The name to store for this player when it sits at `position`
    /// (0-based) in the roster.
    #[must_use]
    pub fn display_name(&self, position: usize) -> String {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            format!("Player {}", position + 1)
        } else {
            trimmed.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_basics() {
        let id = PlayerId::new("alice");
        assert_eq!(id.as_str(), "alice");
        assert_eq!(format!("{}", id), "alice");
        assert_eq!(PlayerId::from("alice"), id);
    }

    #[test]
    fn test_player_id_ordering() {
        let a = PlayerId::new("a");
        let b = PlayerId::new("b");
        assert!(a < b);
    }

    #[test]
    fn test_display_name_default() {
        assert_eq!(NewPlayer::named("   ").display_name(2), "Player 3");
        assert_eq!(NewPlayer::named("").display_name(0), "Player 1");
    }

    #[test]
    fn test_display_name_trimmed() {
        assert_eq!(NewPlayer::named("  Bob ").display_name(0), "Bob");
    }

    #[test]
    fn test_player_id_serialization() {
        let id = PlayerId::new("p-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"p-1\"");
        let back: PlayerId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
