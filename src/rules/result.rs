//! Final standings of a finished game.

use serde::{Deserialize, Serialize};

use crate::core::{GameState, PlayerId};

use super::scoring;

/// Result of a completed game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    /// Single highest total.
    Winner(PlayerId),
    /// Several players share the highest total.
    Tied(Vec<PlayerId>),
}

impl GameResult {
    /// Check if a player won (or shares the win).
    #[must_use]
    pub fn is_winner(&self, player: &PlayerId) -> bool {
        match self {
            GameResult::Winner(p) => p == player,
            GameResult::Tied(ps) => ps.contains(player),
        }
    }

    /// Winning players in turn order.
    #[must_use]
    pub fn winners(&self) -> Vec<PlayerId> {
        match self {
            GameResult::Winner(p) => vec![p.clone()],
            GameResult::Tied(ps) => ps.clone(),
        }
    }
}

/// Standings once the game is finished; `None` while play continues.
#[must_use]
pub fn game_result(state: &GameState) -> Option<GameResult> {
    if !state.is_finished() {
        return None;
    }

    let totals = scoring::totals(state);
    let best = totals.iter().map(|(_, score)| *score).max()?;
    let mut leaders: Vec<PlayerId> = totals
        .into_iter()
        .filter(|(_, score)| *score == best)
        .map(|(id, _)| id)
        .collect();

    if leaders.len() == 1 {
        leaders.pop().map(GameResult::Winner)
    } else {
        Some(GameResult::Tied(leaders))
    }
}
