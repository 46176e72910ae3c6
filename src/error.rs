//! Errors surfaced by the engine's public operations.

use thiserror::Error;

use crate::board::{Color, Move};

/// Failure of a position or notation operation.
///
/// Engine state is left untouched whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The move is not among the legal moves of the side to move.
    #[error("illegal move: {0}")]
    InvalidMove(Move),
    /// `undo_move` was called with no move to take back.
    #[error("no move to undo")]
    EmptyHistory,
    /// The side to move has no legal move; it has lost.
    #[error("no legal moves for {0}")]
    NoLegalMoves(Color),
    /// A square, move, or diagram could not be parsed.
    #[error("malformed notation: {0:?}")]
    MalformedNotation(String),
}
