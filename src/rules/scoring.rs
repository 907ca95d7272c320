//! Standard ten-pin scoring.
//!
//! ## Frame scores
//!
//! - Open frame: pins in the frame.
//! - Spare: 10 + the next roll thrown.
//! - Strike: 10 + the next two rolls thrown, which may come from one or two
//!   later frames.
//! - Tenth frame: pins in the frame, no look-ahead.
//!
//! Look-ahead that has not been thrown yet counts as nothing, so a game in
//! progress always has a well-defined (provisional) total. `FrameScore`
//! records whether a frame's score can still change.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::core::{Frame, GameState, PlayerId, PIN_COUNT};

use super::validator;

/// Score of one frame on a scoresheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameScore {
    /// Frame number (1..=10).
    pub index: u8,

    /// Points contributed by this frame so far.
    pub score: u32,

    /// Cumulative total through this frame.
    pub running_total: u32,

    /// `false` while rolls or look-ahead bonus rolls are still pending.
    pub settled: bool,
}

/// Pins thrown after frame `position`, in delivery order.
fn following_pins(frames: &Vector<Frame>, position: usize) -> impl Iterator<Item = u32> + '_ {
    frames
        .iter()
        .skip(position + 1)
        .flat_map(|f| f.pins().map(u32::from))
}

fn score_frame(frames: &Vector<Frame>, position: usize, frame: &Frame) -> (u32, bool) {
    let base = frame.pin_total();

    if frame.is_tenth() {
        return (base, validator::is_complete(frame));
    }

    let wanted = if frame.is_strike() {
        2
    } else if frame.is_spare() {
        1
    } else {
        return (base, validator::is_complete(frame));
    };

    let bonus: Vec<u32> = following_pins(frames, position).take(wanted).collect();
    (u32::from(PIN_COUNT) + bonus.iter().sum::<u32>(), bonus.len() == wanted)
}

/// Per-frame scores with running totals.
///
/// ```
/// use bowling_engine::core::{Frame, Roll};
/// use bowling_engine::rules::scoring;
/// use chrono::Utc;
///
/// let now = Utc::now();
/// let mut frames = Frame::empty_set();
/// frames[0] = frames[0].with_roll(Roll::new(5, now)).with_roll(Roll::new(5, now));
/// frames[1] = frames[1].with_roll(Roll::new(3, now));
///
/// let scores = scoring::frame_scores(&frames);
/// assert_eq!(scores[0].score, 13);
/// assert_eq!(scores[1].running_total, 16);
/// ```
#[must_use]
pub fn frame_scores(frames: &Vector<Frame>) -> Vec<FrameScore> {
    let mut running_total = 0;
    frames
        .iter()
        .enumerate()
        .map(|(position, frame)| {
            let (score, settled) = score_frame(frames, position, frame);
            running_total += score;
            FrameScore {
                index: frame.index,
                score,
                running_total,
                settled,
            }
        })
        .collect()
}

/// A player's total score (provisional while the game is in progress).
#[must_use]
pub fn total(frames: &Vector<Frame>) -> u32 {
    frames
        .iter()
        .enumerate()
        .map(|(position, frame)| score_frame(frames, position, frame).0)
        .sum()
}

/// Totals for every rostered player, in turn order.
#[must_use]
pub fn totals(state: &GameState) -> Vec<(PlayerId, u32)> {
    state
        .players
        .iter()
        .map(|p| {
            let score = state.frames(&p.id).map_or(0, total);
            (p.id.clone(), score)
        })
        .collect()
}
