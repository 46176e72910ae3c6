//! Game-end detection: breakthrough, elimination, immobility, and repetition.

use crate::board::{Color, Square};
use crate::constants::{N, REPETITION_COUNT, REPETITION_MIN_HISTORY};
use crate::movegen::has_legal_move;
use crate::position::Position;

/// Outcome of a position.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Ongoing,
    Win(Color),
    Draw,
}

impl GameStatus {
    #[inline]
    pub fn is_terminal(self) -> bool {
        self != GameStatus::Ongoing
    }

    /// `+1` for a White win, `-1` for a Black win, `0` otherwise.
    #[inline]
    pub fn white_score(self) -> f64 {
        match self {
            GameStatus::Win(color) => color.sign(),
            GameStatus::Ongoing | GameStatus::Draw => 0.0,
        }
    }
}

/// Determine whether the game is over.
///
/// Checked in order: a piece on its goal row, a side without pieces, the side
/// to move without moves (a loss, not a stalemate), threefold repetition.
pub fn status(pos: &Position) -> GameStatus {
    for color in Color::ALL {
        if has_broken_through(pos, color) {
            return GameStatus::Win(color);
        }
    }
    for color in Color::ALL {
        if pos.count(color) == 0 {
            return GameStatus::Win(color.opponent());
        }
    }
    if !has_legal_move(pos, pos.turn()) {
        return GameStatus::Win(pos.turn().opponent());
    }
    if is_threefold_repetition(pos) {
        return GameStatus::Draw;
    }
    GameStatus::Ongoing
}

/// Whether a piece of `color` stands on its goal row.
pub fn has_broken_through(pos: &Position, color: Color) -> bool {
    let row = color.goal_row();
    (0..N).any(|col| matches!(pos.piece_at(Square::new(row, col)), Some(p) if p.color() == color))
}

/// Whether the current grid has been seen `REPETITION_COUNT` times.
pub fn is_threefold_repetition(pos: &Position) -> bool {
    let history = pos.position_history();
    if history.len() < REPETITION_MIN_HISTORY {
        return false;
    }
    let Some(current) = history.last() else {
        return false;
    };
    history.iter().filter(|key| *key == current).count() >= REPETITION_COUNT
}
