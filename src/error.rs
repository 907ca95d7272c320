//! Engine error taxonomy.
//!
//! Every validation error is raised before the game value is touched, so an
//! `Err` always means "nothing changed". Storage failures are the exception:
//! they happen after an in-memory commit and are reported alongside the
//! committed game (see `engine::Committed`) instead of as an `Err`.

use derive_more::{Display, Error, From};

use crate::core::{GameId, PlayerId};
use crate::storage::StorageError;

/// Why a roll was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum RollRejection {
    /// More pins than are standing.
    #[display("at most {max} pins can fall")]
    ExceedsPins {
        /// Largest legal pin count.
        max: u8,
    },

    /// The frame takes no more rolls.
    #[display("the frame is already complete")]
    FrameComplete,
}

/// Errors returned by engine operations.
#[derive(Clone, Debug, PartialEq, Eq, Display, Error, From)]
pub enum BowlingError {
    /// Pins out of the legal range, or the frame is already complete.
    #[display("invalid roll of {pins} in frame {frame}: {reason}")]
    InvalidRoll {
        /// Pins requested.
        pins: u8,
        /// Frame the roll was aimed at.
        frame: u8,
        /// What made it illegal.
        reason: RollRejection,
    },

    /// The game has no players to roll.
    #[display("no active player")]
    NoActivePlayer,

    /// The game is over.
    #[display("game is finished")]
    GameFinished,

    /// Empty roster, duplicate ids, or an unusable player entry.
    #[display("invalid player list: {reason}")]
    InvalidPlayerList {
        /// Description of the problem.
        reason: String,
    },

    /// No game is active.
    #[display("no active game")]
    NoActiveGame,

    /// The player is not on the roster.
    #[display("unknown player {id}")]
    UnknownPlayer {
        /// Requested id.
        id: PlayerId,
    },

    /// The game is not in the store.
    #[display("unknown game {id}")]
    UnknownGame {
        /// Requested id.
        id: GameId,
    },

    /// Persistence read/write failure.
    #[display("{_0}")]
    #[from]
    IoFailure(#[error(source)] StorageError),
}

impl BowlingError {
    /// Whether this is the `InvalidRoll` kind.
    #[must_use]
    pub fn is_invalid_roll(&self) -> bool {
        matches!(self, BowlingError::InvalidRoll { .. })
    }

    /// Shorthand for `InvalidPlayerList`.
    pub(crate) fn player_list(reason: impl Into<String>) -> Self {
        BowlingError::InvalidPlayerList {
            reason: reason.into(),
        }
    }
}
