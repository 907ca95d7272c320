//! # bowling-engine
//!
//! A ten-pin bowling scorekeeper: roster management, roll validation,
//! standard strike/spare scoring, round-robin turn order, undo, and a
//! persisted collection of games.
//!
//! ## Design Principles
//!
//! 1. **Values, not objects**: every operation takes a game value and builds
//!    a new one. The previous value is the undo snapshot.
//!
//! 2. **Validate, then commit**: an `Err` always means nothing changed.
//!
//! 3. **Memory is authoritative**: a failed save is reported alongside the
//!    committed game and never rolls it back.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: rosters, frames, and history use
//!   `im-rs`, so snapshots share structure with the live game.
//!
//! - **Pure Rules**: validation, scoring, and turn order are free functions
//!   over `core` values, testable without an engine.
//!
//! ## Modules
//!
//! - `core`: Players, rolls, frames, game state, ids, configuration
//! - `rules`: Roll validation, scoring, turn state machine, results
//! - `undo`: Snapshot history
//! - `engine`: `GameEngine`, change publication, scoreboard views
//! - `storage`: Persistence gateway, stored layout, migration
//! - `error`: Error taxonomy

pub mod core;
pub mod rules;
pub mod undo;
pub mod engine;
pub mod storage;
pub mod error;

// Re-export commonly used types
pub use crate::core::{
    Frame, Roll,
    Player, PlayerId, NewPlayer,
    Game, GameId, GameState, Turn,
    IdGenerator, EngineConfig, ConfigError,
    FRAME_COUNT, PIN_COUNT,
};

pub use crate::rules::{legal_range, PinRange, frame_scores, total, totals, FrameScore, game_result, GameResult};

pub use crate::undo::{Snapshot, UndoManager};

pub use crate::engine::{
    GameEngine, Committed,
    StatePublisher, SubscriptionId,
    GameView, PlayerView, FrameView,
};

pub use crate::storage::{
    StorageGateway, StorageSchema, StorageError,
    JsonFileStore, MemoryStore,
    CURRENT_VERSION, LEGACY_VERSION,
};

pub use crate::error::{BowlingError, RollRejection};
