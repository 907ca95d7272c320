//! Game engine: the entry point for callers.
//!
//! `GameEngine` composes the pure rules with undo history, persistence, and
//! change publication. Each public operation maps to one caller action:
//!
//! | Operation        | Effect                                          |
//! |------------------|-------------------------------------------------|
//! | `start_new_game` | new active game, empty history                  |
//! | `add_player`     | join or replace by id (starts a game if none)   |
//! | `remove_player`  | drop a player and their frames                  |
//! | `roll`           | validate, record, advance the turn              |
//! | `undo`           | restore the previous state                      |
//! | `load_game`      | make a stored game active                       |
//! | `delete_game`    | remove a stored game                            |
//! | `reset`          | clear the active game                           |
//!
//! ## Example
//!
//! ```
//! use bowling_engine::core::{EngineConfig, NewPlayer};
//! use bowling_engine::engine::GameEngine;
//! use bowling_engine::storage::MemoryStore;
//!
//! let mut engine = GameEngine::new(MemoryStore::new(), &EngineConfig::default());
//! engine.start_new_game(vec![NewPlayer::named("Ann")]).unwrap();
//! engine.roll(5).unwrap();
//! engine.roll(5).unwrap();
//! engine.roll(3).unwrap();
//!
//! let view = engine.view().unwrap();
//! assert_eq!(view.players[0].frames[0].score, 13);
//! ```

mod game_engine;
mod publisher;
mod view;

pub use game_engine::{Committed, GameEngine};
pub use publisher::{StatePublisher, SubscriptionId};
pub use view::{FrameView, GameView, PlayerView};
