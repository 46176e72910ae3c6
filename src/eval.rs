//! Static evaluation.
//!
//! Scores are from White's point of view: positive favours White. The total
//! is a weighted sum of per-feature sums over all pieces, plus a large
//! terminal bonus once the game is decided so that wins and losses dominate
//! every heuristic term.

use crate::board::{Color, Piece, Square};
use crate::constants::*;
use crate::movegen::push_moves;
use crate::position::Position;
use crate::rules::{self, GameStatus};

/// Relative weight of each feature in the total score.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EvalWeights {
    pub material: f64,
    pub positional: f64,
    pub mobility: f64,
    pub structure: f64,
    pub safety: f64,
    pub development: f64,
    pub control: f64,
    pub endgame: f64,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            material: 1.0,
            positional: 0.7,
            mobility: 0.5,
            structure: 0.5,
            safety: 0.8,
            development: 0.4,
            control: 0.6,
            endgame: 0.5,
        }
    }
}

/// Unweighted feature sums of a position.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct EvalBreakdown {
    pub material: f64,
    pub positional: f64,
    pub mobility: f64,
    pub structure: f64,
    pub safety: f64,
    pub development: f64,
    pub control: f64,
    pub endgame: f64,
    /// `TERMINAL_BONUS` times the signed outcome, unweighted.
    pub terminal: f64,
}

impl EvalBreakdown {
    pub fn total(&self, w: &EvalWeights) -> f64 {
        w.material * self.material
            + w.positional * self.positional
            + w.mobility * self.mobility
            + w.structure * self.structure
            + w.safety * self.safety
            + w.development * self.development
            + w.control * self.control
            + w.endgame * self.endgame
            + self.terminal
    }
}

/// Evaluate with the default weights.
pub fn evaluate(pos: &Position) -> f64 {
    evaluate_with(pos, &EvalWeights::default())
}

pub fn evaluate_with(pos: &Position, weights: &EvalWeights) -> f64 {
    score(pos, rules::status(pos), weights)
}

/// Evaluate when the game status is already known.
pub fn score(pos: &Position, status: GameStatus, weights: &EvalWeights) -> f64 {
    breakdown(pos, status).total(weights)
}

/// Compute every feature sum of `pos`.
pub fn breakdown(pos: &Position, status: GameStatus) -> EvalBreakdown {
    let mut b = EvalBreakdown::default();
    // Squares reachable this ply, per color
    let mut reachable = [[false; SQUARES]; 2];
    let mut moves = Vec::with_capacity(5);
    let endgame = pos.piece_count() <= ENDGAME_PIECES;

    for (sq, piece) in pos.pieces() {
        let sign = piece.sign();
        let color = piece.color();

        b.material += piece.value();

        if sq.is_central() {
            b.positional += CENTER_BONUS * sign;
        }
        if sq.col() == 0 || sq.col() == N - 1 {
            b.positional -= EDGE_PENALTY * sign;
        }
        if sq.row() == 0 || sq.row() == N - 1 {
            b.positional -= EDGE_PENALTY * sign;
        }

        moves.clear();
        push_moves(pos, sq, &mut moves);
        b.mobility += MOBILITY_PER_MOVE * moves.len() as f64 * sign;
        for mv in &moves {
            reachable[color.index()][mv.to.index()] = true;
        }

        let friends = friendly_neighbours(pos, sq, piece) as f64;
        b.structure += STRUCTURE_PER_NEIGHBOUR * friends * sign;
        b.safety += SAFETY_PER_NEIGHBOUR * friends * sign;

        let mut development = advancement(sq, color) as f64 / N as f64;
        if sq.is_central() {
            development += DEVELOPMENT_CENTER_BONUS;
        }
        b.development += development * sign;

        if endgame {
            let distance = sq.row().abs_diff(CENTER.0) + sq.col().abs_diff(CENTER.1);
            b.endgame += (-ENDGAME_DISTANCE * distance as f64
                + ENDGAME_ADVANCE * advancement(sq, color) as f64)
                * sign;
        }
    }

    for color in Color::ALL {
        for (idx, _) in reachable[color.index()].iter().enumerate().filter(|(_, r)| **r) {
            let weight = if Square::from_index(idx).is_central() {
                CONTROL_CENTER
            } else {
                CONTROL_OTHER
            };
            b.control += weight * color.sign();
        }
    }

    b.terminal = TERMINAL_BONUS * status.white_score();
    b
}

/// Rows travelled from the home row towards the goal row.
fn advancement(sq: Square, color: Color) -> usize {
    match color {
        Color::White => N - 1 - sq.row(),
        Color::Black => sq.row(),
    }
}

/// Number of same-colored pieces among the 8 neighbours.
fn friendly_neighbours(pos: &Position, sq: Square, piece: Piece) -> usize {
    NEIGHBOURS
        .iter()
        .filter_map(|&(dr, dc)| sq.offset(dr, dc))
        .filter(|&n| pos.piece_at(n) == Some(piece))
        .count()
}
