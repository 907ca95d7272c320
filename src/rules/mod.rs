//! Bowling rules: roll validation, scoring, turn order, final standings.
//!
//! Everything here is a pure function over `core` values. The engine
//! composes them; tests can call them directly.

pub mod validator;
pub mod scoring;
pub mod turn;
pub mod result;

pub use validator::{legal_range, PinRange};
pub use scoring::{frame_scores, total, totals, FrameScore};
pub use result::{game_result, GameResult};
