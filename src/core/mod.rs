//! Core data model: players, rolls, frames, game state, ids, configuration.
//!
//! These are plain values. Nothing in this module decides whether a roll is
//! legal or whose turn it is; that lives in `rules`.

pub mod player;
pub mod frame;
pub mod state;
pub mod ids;
pub mod config;

pub use player::{NewPlayer, Player, PlayerId};
pub use frame::{Frame, Roll};
pub use state::{Game, GameId, GameState, Turn};
pub use ids::IdGenerator;
pub use config::{ConfigError, EngineConfig};

/// Frames in a game.
pub const FRAME_COUNT: u8 = 10;

/// Pins in a full rack.
pub const PIN_COUNT: u8 = 10;
