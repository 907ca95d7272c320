//! Read model handed to callers.

use std::fmt;

use serde::Serialize;

use crate::core::{Game, GameId, PlayerId};
use crate::rules::{frame_scores, game_result, legal_range};

/// One frame on a player's scoresheet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameView {
    /// Frame number (1..=10).
    pub index: u8,
    /// Pins per roll.
    pub rolls: Vec<u8>,
    /// Conventional marks, e.g. `X`, `7/`, `-3`.
    pub notation: String,
    /// Points from this frame so far.
    pub score: u32,
    /// Cumulative total through this frame.
    pub running_total: u32,
    /// Whether `score` is final.
    pub settled: bool,
}

/// One player's row on the scoreboard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    /// Player the row belongs to.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Points scored so far, counting unsettled bonuses as they stand.
    pub total: u32,
    /// All ten frames, in order.
    pub frames: Vec<FrameView>,
}

/// Everything a front end needs to render a game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    /// Game being shown.
    pub game_id: GameId,
    /// Scoreboard rows in roster order.
    pub players: Vec<PlayerView>,
    /// Player due to roll; `None` when finished or nobody is playing.
    pub current_player_id: Option<PlayerId>,
    /// Frame the current player is in (1..=10).
    pub current_frame_index: Option<u8>,
    /// Whether every player has completed frame 10.
    pub finished: bool,
    /// Most pins the current player may knock down with the next roll.
    pub next_max_pins: Option<u8>,
    /// Players sharing the top score; empty until the game is finished.
    pub winners: Vec<PlayerId>,
    /// Changes that can still be undone.
    pub undo_depth: usize,
}

impl GameView {
    /// Build the view of `game`.
    #[must_use]
    pub fn of(game: &Game) -> Self {
        let state = &game.state;

        let players = state
            .players
            .iter()
            .map(|player| {
                let frames = state.frames(&player.id).cloned().unwrap_or_default();
                let scores = frame_scores(&frames);
                let frame_views: Vec<FrameView> = frames
                    .iter()
                    .zip(&scores)
                    .map(|(frame, score)| FrameView {
                        index: frame.index,
                        rolls: frame.pins().collect(),
                        notation: frame.notation(),
                        score: score.score,
                        running_total: score.running_total,
                        settled: score.settled,
                    })
                    .collect();
                PlayerView {
                    id: player.id.clone(),
                    name: player.name.clone(),
                    total: scores.last().map_or(0, |s| s.running_total),
                    frames: frame_views,
                }
            })
            .collect();

        let next_max_pins = state.turn.player().and_then(|id| {
            let frame = state.turn.frame()?;
            let frames = state.frames(id)?;
            legal_range(frames.get(usize::from(frame).checked_sub(1)?)?).map(|r| r.max)
        });

        Self {
            game_id: state.id.clone(),
            players,
            current_player_id: state.current_player_id().cloned(),
            current_frame_index: state.current_frame_index(),
            finished: state.is_finished(),
            next_max_pins,
            winners: game_result(state).map(|r| r.winners()).unwrap_or_default(),
            undo_depth: game.undo_depth(),
        }
    }

    /// Row for one player.
    #[must_use]
    pub fn player(&self, id: &PlayerId) -> Option<&PlayerView> {
        self.players.iter().find(|p| &p.id == id)
    }
}

impl fmt::Display for GameView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Game {}", self.game_id)?;

        let width = self
            .players
            .iter()
            .map(|p| p.name.chars().count())
            .max()
            .unwrap_or(0)
            .max(6);

        write!(f, "{:width$} ", "")?;
        for index in 1..=10 {
            write!(f, "|{index:^5}")?;
        }
        writeln!(f, "| total")?;

        for player in &self.players {
            let marker = if self.current_player_id.as_ref() == Some(&player.id) { '>' } else { ' ' };
            write!(f, "{:width$}{marker}", player.name)?;
            for frame in &player.frames {
                write!(f, "|{:^5}", frame.notation)?;
            }
            writeln!(f, "| {:>5}", player.total)?;

            write!(f, "{:width$} ", "")?;
            for frame in &player.frames {
                if frame.rolls.is_empty() {
                    write!(f, "|{:^5}", "")?;
                } else {
                    write!(f, "|{:^5}", frame.running_total)?;
                }
            }
            writeln!(f, "|")?;
        }

        if self.finished {
            let names: Vec<&str> = self
                .winners
                .iter()
                .filter_map(|id| self.player(id).map(|p| p.name.as_str()))
                .collect();
            match names.as_slice() {
                [] => writeln!(f, "Game over"),
                [one] => writeln!(f, "Game over: {one} wins"),
                many => writeln!(f, "Game over: tie between {}", many.join(", ")),
            }
        } else if let (Some(id), Some(frame)) = (&self.current_player_id, self.current_frame_index) {
            let name = self.player(id).map_or(id.as_str(), |p| p.name.as_str());
            match self.next_max_pins {
                Some(max) => writeln!(f, "Frame {frame}: {name} to roll (0-{max})"),
                None => writeln!(f, "Frame {frame}: {name} to roll"),
            }
        } else {
            writeln!(f, "Waiting for players")
        }
    }
}
