//! Constants for board geometry, evaluation terms, and search parameters.
//!
//! Evaluation weights live in [`crate::eval::EvalWeights`] so they can be
//! tuned at runtime; the per-feature unit values below are fixed.

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size (NxN). Fianco is always played on 9x9.
pub const N: usize = 9;

/// Number of cells on the board.
pub const SQUARES: usize = N * N;

/// First row/column of the central 4x4 block.
pub const CENTER_MIN: usize = 2;

/// Last row/column of the central 4x4 block (inclusive).
pub const CENTER_MAX: usize = 5;

/// Middle of the board, used for endgame centralization.
pub const CENTER: (usize, usize) = (4, 4);

/// Column letters used in coordinate notation, left to right.
pub const COLUMN_LETTERS: [char; N] = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i'];

/// Offsets to the 8 neighbours of a square as (row, col) deltas.
/// Order: North, East, South, West, NE, SE, SW, NW
pub const NEIGHBOURS: [(isize, isize); 8] = [
    (-1, 0),
    (0, 1),
    (1, 0),
    (0, -1),
    (-1, 1),
    (1, 1),
    (1, -1),
    (-1, -1),
];

// =============================================================================
// Rules
// =============================================================================

/// Occurrences of one grid that make a draw.
pub const REPETITION_COUNT: usize = 3;

/// Minimum recorded positions before repetition is checked.
pub const REPETITION_MIN_HISTORY: usize = 6;

// =============================================================================
// Evaluation Terms
// =============================================================================

/// Material value of a single piece.
pub const PIECE_VALUE: f64 = 5.0;

/// Added to the heuristic score for a decided game, scaled by the outcome.
pub const TERMINAL_BONUS: f64 = 10_000.0;

/// Positional bonus for a piece inside the central block.
pub const CENTER_BONUS: f64 = 0.2;

/// Positional penalty per edge a piece touches.
pub const EDGE_PENALTY: f64 = 0.1;

/// Mobility credit per available move.
pub const MOBILITY_PER_MOVE: f64 = 0.05;

/// Structure credit per same-colored neighbour.
pub const STRUCTURE_PER_NEIGHBOUR: f64 = 0.1;

/// Safety credit per same-colored neighbour.
pub const SAFETY_PER_NEIGHBOUR: f64 = 0.2;

/// Flat development bonus for a piece inside the central block.
pub const DEVELOPMENT_CENTER_BONUS: f64 = 0.1;

/// Control credit for a reachable central square.
pub const CONTROL_CENTER: f64 = 0.3;

/// Control credit for any other reachable square.
pub const CONTROL_OTHER: f64 = 0.1;

/// Total piece count at or below which the endgame term applies.
pub const ENDGAME_PIECES: usize = 6;

/// Endgame penalty per step of Manhattan distance from the center.
pub const ENDGAME_DISTANCE: f64 = 0.1;

/// Endgame credit per row advanced from the home row.
///
/// Same scale as `ENDGAME_DISTANCE`: a piece earns at most 0.8 here, far
/// below `PIECE_VALUE`, so advancing never pays for a lost piece.
pub const ENDGAME_ADVANCE: f64 = 0.1;

// =============================================================================
// Search Parameters
// =============================================================================

/// Default nominal search depth in plies.
pub const DEFAULT_DEPTH: u32 = 3;

/// Capture-only plies searched past the nominal horizon.
pub const QUIESCENCE_PLIES: u32 = 3;

/// Default number of transposition table slots.
pub const DEFAULT_TT_CAPACITY: usize = 1 << 20;

/// Default seed for the Zobrist key table.
pub const DEFAULT_ZOBRIST_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

/// Nodes between two time-limit checks.
pub const DEADLINE_CHECK_NODES: u64 = 2048;
