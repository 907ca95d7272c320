//! Rolls and frames.
//!
//! A `Frame` is an append-only list of rolls. Which rolls are legal is
//! decided by `rules::validator`; this module only stores and reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{FRAME_COUNT, PIN_COUNT};

/// One delivery: how many pins fell, and when.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roll {
    /// Pins knocked down (0..=10).
    pub pins: u8,

    /// When the roll was recorded.
    pub timestamp: DateTime<Utc>,
}

impl Roll {
    /// Create a roll.
    #[must_use]
    pub fn new(pins: u8, timestamp: DateTime<Utc>) -> Self {
        Self { pins, timestamp }
    }
}

/// One of the ten scoring units of a player's game.
///
/// Rolls are kept in a `SmallVec` sized for the tenth frame's three rolls,
/// so frames never allocate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// 1-based frame number (1..=10).
    pub index: u8,

    /// Rolls in delivery order.
    #[serde(default)]
    pub rolls: SmallVec<[Roll; 3]>,
}

impl Frame {
    /// Create an empty frame.
    #[must_use]
    pub fn new(index: u8) -> Self {
        debug_assert!((1..=FRAME_COUNT).contains(&index));
        Self {
            index,
            rolls: SmallVec::new(),
        }
    }

    /// The ten empty frames every player starts with.
    #[must_use]
    pub fn empty_set() -> im::Vector<Frame> {
        (1..=FRAME_COUNT).map(Frame::new).collect()
    }

    /// Return a copy of this frame with `roll` appended.
    #[must_use]
    pub fn with_roll(&self, roll: Roll) -> Self {
        let mut next = self.clone();
        next.rolls.push(roll);
        next
    }

    /// Whether this is the tenth (bonus-roll) frame.
    #[must_use]
    pub fn is_tenth(&self) -> bool {
        self.index == FRAME_COUNT
    }

    /// Pin counts in delivery order.
    pub fn pins(&self) -> impl Iterator<Item = u8> + '_ {
        self.rolls.iter().map(|r| r.pins)
    }

    /// Number of rolls thrown in this frame.
    #[must_use]
    pub fn roll_count(&self) -> usize {
        self.rolls.len()
    }

    /// Whether no roll has been thrown yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rolls.is_empty()
    }

    /// Pins of the roll at `n` (0-based), if thrown.
    #[must_use]
    pub fn pins_at(&self, n: usize) -> Option<u8> {
        self.rolls.get(n).map(|r| r.pins)
    }

    /// First roll cleared the rack.
    #[must_use]
    pub fn is_strike(&self) -> bool {
        self.pins_at(0) == Some(PIN_COUNT)
    }

    /// First two rolls cleared the rack, and the first alone did not.
    #[must_use]
    pub fn is_spare(&self) -> bool {
        match (self.pins_at(0), self.pins_at(1)) {
            (Some(first), Some(second)) => first < PIN_COUNT && first + second == PIN_COUNT,
            _ => false,
        }
    }

    /// Raw sum of every pin in this frame.
    #[must_use]
    pub fn pin_total(&self) -> u32 {
        self.pins().map(u32::from).sum()
    }

    /// Scoresheet notation: `X` strike, `/` spare, `-` gutter, digits otherwise.
    ///
    /// ```
    /// use bowling_engine::core::{Frame, Roll};
    /// use chrono::Utc;
    ///
    /// let now = Utc::now();
    /// let frame = Frame::new(10)
    ///     .with_roll(Roll::new(10, now))
    ///     .with_roll(Roll::new(7, now))
    ///     .with_roll(Roll::new(3, now));
    /// assert_eq!(frame.notation(), "X7/");
    /// ```
    #[must_use]
    pub fn notation(&self) -> String {
        let mut out = String::with_capacity(3);
        let mut standing = PIN_COUNT;
        let mut fresh = true;
        for pins in self.pins() {
            // A tenth-frame bonus ball may exceed what was left; it went at a new rack.
            if pins > standing {
                standing = PIN_COUNT;
                fresh = true;
            }

            let symbol = if fresh && pins == PIN_COUNT {
                'X'
            } else if pins == standing {
                '/'
            } else if pins == 0 {
                '-'
            } else {
                char::from_digit(u32::from(pins), 10).unwrap_or('?')
            };
            out.push(symbol);

            standing -= pins;
            fresh = standing == 0;
            if fresh {
                standing = PIN_COUNT;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(index: u8, pins: &[u8]) -> Frame {
        let now = Utc::now();
        pins.iter()
            .fold(Frame::new(index), |f, &p| f.with_roll(Roll::new(p, now)))
    }

    #[test]
    fn test_empty_set() {
        let frames = Frame::empty_set();
        assert_eq!(frames.len(), 10);
        for (i, f) in frames.iter().enumerate() {
            assert_eq!(f.index as usize, i + 1);
            assert!(f.is_empty());
        }
        assert!(frames[9].is_tenth());
    }

    #[test]
    fn test_with_roll_leaves_original() {
        let original = Frame::new(1);
        let next = original.with_roll(Roll::new(4, Utc::now()));

        assert!(original.is_empty());
        assert_eq!(next.roll_count(), 1);
    }

    #[test]
    fn test_strike_and_spare() {
        assert!(frame(1, &[10]).is_strike());
        assert!(!frame(1, &[10]).is_spare());
        assert!(frame(1, &[6, 4]).is_spare());
        assert!(!frame(1, &[6, 3]).is_spare());
        assert!(!frame(10, &[0, 10]).is_strike());
        assert!(frame(10, &[0, 10]).is_spare());
    }

    #[test]
    fn test_notation() {
        assert_eq!(frame(1, &[]).notation(), "");
        assert_eq!(frame(1, &[10]).notation(), "X");
        assert_eq!(frame(1, &[7, 3]).notation(), "7/");
        assert_eq!(frame(1, &[9, 0]).notation(), "9-");
        assert_eq!(frame(1, &[0, 10]).notation(), "-/");
        assert_eq!(frame(10, &[10, 10, 10]).notation(), "XXX");
        assert_eq!(frame(10, &[5, 5, 10]).notation(), "5/X");
        assert_eq!(frame(10, &[10, 3, 4]).notation(), "X34");
        assert_eq!(frame(10, &[10, 7, 9]).notation(), "X79");
        assert_eq!(frame(10, &[10, 7, 10]).notation(), "X7X");
    }

    #[test]
    fn test_notation_gutter_then_ten_is_spare() {
        assert_eq!(frame(1, &[0, 10]).notation(), "-/");
        assert_eq!(frame(10, &[0, 10, 10]).notation(), "-/X");
        assert_eq!(frame(10, &[10, 0, 10]).notation(), "X-/");
    }

    #[test]
    fn test_pin_total() {
        assert_eq!(frame(10, &[10, 10, 10]).pin_total(), 30);
        assert_eq!(frame(3, &[]).pin_total(), 0);
    }
}
