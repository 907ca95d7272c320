//! Identifier generation.
//!
//! Ids only need to be unique within a store, so a seeded ChaCha stream is
//! enough. Seeding makes ids reproducible in tests:
//!
//! ```
//! use bowling_engine::core::IdGenerator;
//!
//! let mut a = IdGenerator::new(7);
//! let mut b = IdGenerator::new(7);
//! assert_eq!(a.game_id(), b.game_id());
//! assert_ne!(a.player_id(), a.player_id());
//! ```

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::player::PlayerId;
use super::state::GameId;

/// Generates opaque game and player ids.
#[derive(Clone, Debug)]
pub struct IdGenerator {
    inner: ChaCha8Rng,
}

impl IdGenerator {
    /// Deterministic generator.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Generator seeded from the thread RNG.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// Seeded when `seed` is set, otherwise from entropy.
    #[must_use]
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::new)
    }

    fn token(&mut self) -> String {
        format!("{:016x}", self.inner.next_u64())
    }

    /// A fresh game id.
    pub fn game_id(&mut self) -> GameId {
        GameId::new(format!("game-{}", self.token()))
    }

    /// A fresh player id.
    pub fn player_id(&mut self) -> PlayerId {
        PlayerId::new(format!("player-{}", self.token()))
    }
}
