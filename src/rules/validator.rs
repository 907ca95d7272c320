//! Roll validation.
//!
//! Computes how many pins the next roll in a frame may knock down, or that
//! the frame takes no further roll. Completion is defined by the same
//! function: a frame is complete exactly when no next roll is legal.
//!
//! ## Rules
//!
//! - Frames 1-9: a strike ends the frame; otherwise the second roll may take
//!   at most the pins left standing.
//! - Frame 10: after `X` the second roll has a full rack. A strike or spare
//!   in the first two rolls earns a third roll at a full rack, so `X 7 9`
//!   is a legal tenth frame.

use serde::{Deserialize, Serialize};

use crate::core::{Frame, PIN_COUNT};
use crate::error::{BowlingError, RollRejection};

/// Inclusive range of legal pin counts for the next roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinRange {
    /// Always 0.
    pub min: u8,
    /// Pins currently standing.
    pub max: u8,
}

impl PinRange {
    fn up_to(max: u8) -> Self {
        Self { min: 0, max }
    }

    /// Whether `pins` falls within the range.
    #[must_use]
    pub fn contains(&self, pins: u8) -> bool {
        (self.min..=self.max).contains(&pins)
    }
}

/// Legal range for the next roll in `frame`, or `None` if the frame is
/// complete.
#[must_use]
pub fn legal_range(frame: &Frame) -> Option<PinRange> {
    if frame.is_tenth() {
        tenth_frame_range(frame)
    } else {
        regular_frame_range(frame)
    }
}

fn regular_frame_range(frame: &Frame) -> Option<PinRange> {
    match (frame.pins_at(0), frame.roll_count()) {
        (None, _) => Some(PinRange::up_to(PIN_COUNT)),
        (Some(PIN_COUNT), _) => None,
        (Some(first), 1) => Some(PinRange::up_to(PIN_COUNT.saturating_sub(first))),
        _ => None,
    }
}

fn tenth_frame_range(frame: &Frame) -> Option<PinRange> {
    match (frame.pins_at(0), frame.pins_at(1), frame.roll_count()) {
        (None, _, _) => Some(PinRange::up_to(PIN_COUNT)),
        (Some(PIN_COUNT), None, _) => Some(PinRange::up_to(PIN_COUNT)),
        (Some(first), None, _) => Some(PinRange::up_to(PIN_COUNT.saturating_sub(first))),
        (Some(first), Some(second), 2) => {
            if first == PIN_COUNT || first + second == PIN_COUNT {
                Some(PinRange::up_to(PIN_COUNT))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Whether the frame takes no further roll.
#[must_use]
pub fn is_complete(frame: &Frame) -> bool {
    legal_range(frame).is_none()
}

/// Check that `pins` may be rolled next in `frame`.
pub fn validate(frame: &Frame, pins: u8) -> Result<(), BowlingError> {
    let range = legal_range(frame).ok_or(BowlingError::InvalidRoll {
        pins,
        frame: frame.index,
        reason: RollRejection::FrameComplete,
    })?;

    if range.contains(pins) {
        Ok(())
    } else {
        Err(BowlingError::InvalidRoll {
            pins,
            frame: frame.index,
            reason: RollRejection::ExceedsPins { max: range.max },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Roll;
    use chrono::Utc;
    use proptest::prelude::*;

    fn frame(index: u8, pins: &[u8]) -> Frame {
        let now = Utc::now();
        pins.iter()
            .fold(Frame::new(index), |f, &p| f.with_roll(Roll::new(p, now)))
    }

    fn max(index: u8, pins: &[u8]) -> Option<u8> {
        legal_range(&frame(index, pins)).map(|r| r.max)
    }

    #[test]
    fn test_regular_frame_ranges() {
        assert_eq!(max(1, &[]), Some(10));
        assert_eq!(max(1, &[3]), Some(7));
        assert_eq!(max(1, &[0]), Some(10));
        assert_eq!(max(1, &[10]), None);
        assert_eq!(max(1, &[3, 4]), None);
        assert_eq!(max(9, &[5, 5]), None);
    }

    #[test]
    fn test_tenth_frame_ranges() {
        assert_eq!(max(10, &[]), Some(10));
        assert_eq!(max(10, &[10]), Some(10));
        assert_eq!(max(10, &[4]), Some(6));
        assert_eq!(max(10, &[4, 5]), None);
        assert_eq!(max(10, &[4, 6]), Some(10));
        assert_eq!(max(10, &[10, 10]), Some(10));
        assert_eq!(max(10, &[10, 7]), Some(10));
        assert_eq!(max(10, &[10, 0]), Some(10));
        assert_eq!(max(10, &[10, 10, 10]), None);
        assert_eq!(max(10, &[6, 4, 2]), None);
    }

    #[test]
    fn test_range_min_is_zero() {
        let range = legal_range(&frame(4, &[6])).unwrap();
        assert_eq!(range.min, 0);
        assert!(range.contains(0));
        assert!(range.contains(4));
        assert!(!range.contains(5));
    }

    #[test]
    fn test_validate_exceeds() {
        let err = validate(&frame(2, &[7]), 4).unwrap_err();
        assert_eq!(
            err,
            BowlingError::InvalidRoll {
                pins: 4,
                frame: 2,
                reason: RollRejection::ExceedsPins { max: 3 },
            }
        );
    }

    #[test]
    fn test_validate_over_ten() {
        let err = validate(&frame(1, &[]), 11).unwrap_err();
        assert!(err.is_invalid_roll());
    }

    #[test]
    fn test_validate_complete_frame() {
        let err = validate(&frame(5, &[10]), 0).unwrap_err();
        assert!(matches!(
            err,
            BowlingError::InvalidRoll {
                reason: RollRejection::FrameComplete,
                ..
            }
        ));
    }

    #[test]
    fn test_is_complete() {
        assert!(!is_complete(&frame(1, &[])));
        assert!(!is_complete(&frame(1, &[9])));
        assert!(is_complete(&frame(1, &[9, 1])));
        assert!(!is_complete(&frame(10, &[9, 1])));
        assert!(is_complete(&frame(10, &[9, 1, 0])));
        assert!(is_complete(&frame(10, &[10, 7, 9])));
    }

    #[test]
    fn test_tenth_bonus_ball_after_strike_has_full_rack() {
        assert!(validate(&frame(10, &[10, 7]), 9).is_ok());
        assert!(validate(&frame(10, &[10, 7]), 10).is_ok());
        assert!(validate(&frame(10, &[10, 7]), 11).is_err());
    }

    proptest! {
        /// Feeding a frame only rolls the validator accepts never produces
        /// a frame that breaks the per-frame pin and roll-count limits.
        #[test]
        fn prop_accepted_rolls_respect_limits(
            index in 1u8..=10,
            attempts in proptest::collection::vec(0u8..=12, 0..6),
        ) {
            let now = Utc::now();
            let mut f = Frame::new(index);
            for pins in attempts {
                if validate(&f, pins).is_ok() {
                    f = f.with_roll(Roll::new(pins, now));
                }
            }

            let max_rolls = if index == 10 { 3 } else { 2 };
            prop_assert!(f.roll_count() <= max_rolls);
            prop_assert!(f.pins().all(|p| p <= PIN_COUNT));
            if index < 10 {
                prop_assert!(f.pin_total() <= u32::from(PIN_COUNT));
            } else if f.roll_count() == 3 {
                let first_two = u32::from(f.pins_at(0).unwrap()) + u32::from(f.pins_at(1).unwrap());
                prop_assert!(first_two >= u32::from(PIN_COUNT));
            }
        }
    }
}
