//! Move generation.
//!
//! A piece has up to five moves: one step sideways left, one step forward,
//! one step sideways right, and a diagonal-forward jump over an opposing
//! piece on either side. "Forward" depends on the color (see
//! [`Color::forward`]).

use crate::board::{Color, Move, Square};
use crate::position::{CapturePolicy, Position};

/// Append all moves of the piece on `sq` to `out`.
///
/// Translations come first, in the order sideways-left, forward,
/// sideways-right, followed by the jumps. Does nothing for an empty square.
pub fn push_moves(pos: &Position, sq: Square, out: &mut Vec<Move>) {
    let Some(piece) = pos.piece_at(sq) else {
        return;
    };
    let d = piece.color().forward();

    for (dr, dc) in [(0, -d), (d, 0), (0, d)] {
        if let Some(to) = sq.offset(dr, dc) {
            if pos.is_empty(to) {
                out.push(Move::translation(sq, to));
            }
        }
    }
    push_captures(pos, sq, piece.color(), out);
}

fn push_captures(pos: &Position, sq: Square, color: Color, out: &mut Vec<Move>) {
    let d = color.forward();
    for side in [-1, 1] {
        let Some(over) = sq.offset(d, side) else {
            continue;
        };
        if !pos.has_opponent(over, color) {
            continue;
        }
        if let Some(to) = sq.offset(2 * d, 2 * side) {
            if pos.is_empty(to) {
                out.push(Move::jump(sq, to));
            }
        }
    }
}

/// All moves of the piece on `sq`, ignoring the capture policy.
pub fn generate_moves(pos: &Position, sq: Square) -> Vec<Move> {
    let mut moves = Vec::with_capacity(5);
    push_moves(pos, sq, &mut moves);
    moves
}

/// Capturing moves for `color`, in row-major order of the capturing piece.
pub fn capture_moves(pos: &Position, color: Color) -> Vec<Move> {
    let mut captures = Vec::new();
    for (sq, piece) in pos.pieces() {
        if piece.color() == color {
            push_captures(pos, sq, color, &mut captures);
        }
    }
    captures
}

/// Legal moves for `color` under the position's capture policy.
///
/// With [`CapturePolicy::Mandatory`] only the captures are returned when at
/// least one exists.
pub fn legal_moves(pos: &Position, color: Color) -> Vec<Move> {
    let mut moves = Vec::with_capacity(48);
    for (sq, piece) in pos.pieces() {
        if piece.color() == color {
            push_moves(pos, sq, &mut moves);
        }
    }
    if pos.policy() == CapturePolicy::Mandatory && moves.iter().any(|m| m.capture) {
        moves.retain(|m| m.capture);
    }
    moves
}

/// Whether `color` has at least one move.
pub fn has_legal_move(pos: &Position, color: Color) -> bool {
    let mut scratch = Vec::with_capacity(5);
    pos.pieces().any(|(sq, piece)| {
        if piece.color() != color {
            return false;
        }
        scratch.clear();
        push_moves(pos, sq, &mut scratch);
        !scratch.is_empty()
    })
}

/// Stable reorder placing captures before translations.
pub fn order_moves(moves: &mut [Move]) {
    moves.sort_by_key(|m| !m.capture);
}
