//! Fianco position representation and move execution.
//!
//! This module provides the mutable game state:
//! - Board cells in a row-major array of `N * N` optional pieces
//! - Side to move and the capture policy in force
//! - Move and grid histories for undo and repetition detection
//! - Captured-piece stacks so captures can be taken back exactly
//!
//! [`Position::apply_move`] and [`Position::undo_move`] are the checked entry
//! points. The search uses the unchecked make/unmake pair through
//! [`Position::scoped`], which takes the move back when the guard drops.

use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::board::{Color, Move, Piece, Square};
use crate::constants::{COLUMN_LETTERS, N, SQUARES};
use crate::error::EngineError;
use crate::movegen;

/// How captures constrain the moves of the side to move.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CapturePolicy {
    /// When any capture exists, only captures are legal.
    #[default]
    Mandatory,
    /// Every move is legal; captures are only searched first.
    Preferred,
}

/// Exact fingerprint of the grid: one occupancy bit per square and color.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct GridKey {
    white: u128,
    black: u128,
}

/// A Fianco position (board state plus history).
#[derive(Clone, Debug, PartialEq)]
pub struct Position {
    cells: [Option<Piece>; SQUARES],
    turn: Color,
    policy: CapturePolicy,
    move_history: Vec<Move>,
    position_history: Vec<GridKey>,
    /// Captured pieces, indexed by the captured piece's color.
    captured: [Vec<Piece>; 2],
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

/// Interior pieces of the starting layout for Black; White mirrors them.
const BLACK_INTERIOR: [(usize, usize); 6] = [(1, 1), (1, 7), (2, 2), (2, 6), (3, 3), (3, 5)];

impl Position {
    /// The standard starting position with White to move.
    pub fn new() -> Self {
        let mut pos = Self::empty(Color::White);
        for col in 0..N {
            pos.cells[Square::new(0, col).index()] = Some(Piece::new(Color::Black));
            pos.cells[Square::new(N - 1, col).index()] = Some(Piece::new(Color::White));
        }
        for (row, col) in BLACK_INTERIOR {
            pos.cells[Square::new(row, col).index()] = Some(Piece::new(Color::Black));
            pos.cells[Square::new(N - 1 - row, col).index()] = Some(Piece::new(Color::White));
        }
        pos
    }

    /// An empty board with the given side to move.
    pub fn empty(turn: Color) -> Self {
        Self {
            cells: [None; SQUARES],
            turn,
            policy: CapturePolicy::default(),
            move_history: Vec::new(),
            position_history: Vec::new(),
            captured: [Vec::new(), Vec::new()],
        }
    }

    /// A position with pieces on the listed squares and no history.
    pub fn with_pieces(turn: Color, white: &[Square], black: &[Square]) -> Self {
        let mut pos = Self::empty(turn);
        for sq in white {
            pos.cells[sq.index()] = Some(Piece::new(Color::White));
        }
        for sq in black {
            pos.cells[sq.index()] = Some(Piece::new(Color::Black));
        }
        pos
    }

    /// Parse a 9-line diagram, row 0 first, using `W`, `B` and `.`.
    ///
    /// Whitespace inside a line is ignored, as are blank lines.
    pub fn from_diagram(diagram: &str, turn: Color) -> Result<Self, EngineError> {
        let malformed = || EngineError::MalformedNotation(diagram.to_string());
        let rows: Vec<Vec<char>> = diagram
            .lines()
            .map(|line| line.chars().filter(|c| !c.is_whitespace()).collect::<Vec<_>>())
            .filter(|row| !row.is_empty())
            .collect();
        if rows.len() != N {
            return Err(malformed());
        }

        let mut pos = Self::empty(turn);
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != N {
                return Err(malformed());
            }
            for (col, &c) in cells.iter().enumerate() {
                pos.cells[Square::new(row, col).index()] = match c.to_ascii_uppercase() {
                    'W' => Some(Piece::new(Color::White)),
                    'B' => Some(Piece::new(Color::Black)),
                    '.' => None,
                    _ => return Err(malformed()),
                };
            }
        }
        Ok(pos)
    }

    /// Same grid and history with a different capture policy.
    pub fn with_policy(mut self, policy: CapturePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Same grid with the other side to move and no history.
    ///
    /// Used to score one grid from both sides.
    pub fn with_turn(&self, turn: Color) -> Self {
        let mut pos = Self::empty(turn);
        pos.cells = self.cells;
        pos.policy = self.policy;
        pos
    }

    #[inline]
    pub fn turn(&self) -> Color {
        self.turn
    }

    #[inline]
    pub fn policy(&self) -> CapturePolicy {
        self.policy
    }

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.cells[sq.index()]
    }

    #[inline]
    pub fn is_empty(&self, sq: Square) -> bool {
        self.cells[sq.index()].is_none()
    }

    /// Whether `sq` holds a piece of the opponent of `color`.
    #[inline]
    pub fn has_opponent(&self, sq: Square, color: Color) -> bool {
        matches!(self.cells[sq.index()], Some(p) if p.color() != color)
    }

    /// Occupied squares with their pieces, in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(idx, cell)| cell.map(|p| (Square::from_index(idx), p)))
    }

    pub fn piece_count(&self) -> usize {
        self.cells.iter().flatten().count()
    }

    pub fn count(&self, color: Color) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|p| p.color() == color)
            .count()
    }

    pub fn move_history(&self) -> &[Move] {
        &self.move_history
    }

    pub fn position_history(&self) -> &[GridKey] {
        &self.position_history
    }

    pub fn last_move(&self) -> Option<Move> {
        self.move_history.last().copied()
    }

    /// Pieces of `color` that have been captured, oldest first.
    pub fn captured(&self, color: Color) -> &[Piece] {
        &self.captured[color.index()]
    }

    /// Exact grid fingerprint of the current position.
    pub fn grid_key(&self) -> GridKey {
        let mut key = GridKey::default();
        for (sq, piece) in self.pieces() {
            let bit = 1u128 << sq.index();
            match piece.color() {
                Color::White => key.white |= bit,
                Color::Black => key.black |= bit,
            }
        }
        key
    }

    /// Apply a move for the side to move.
    ///
    /// The move is matched against the legal moves by its squares, so the
    /// capture flag of `mv` does not need to be set by the caller.
    ///
    /// # Errors
    /// - [`EngineError::InvalidMove`] if the move is not legal here
    pub fn apply_move(&mut self, mv: Move) -> Result<(), EngineError> {
        let legal = movegen::legal_moves(self, self.turn)
            .into_iter()
            .find(|m| *m == mv)
            .ok_or(EngineError::InvalidMove(mv))?;
        self.make_move(legal);
        Ok(())
    }

    /// Take back the last move.
    ///
    /// # Errors
    /// - [`EngineError::EmptyHistory`] if no move has been applied
    pub fn undo_move(&mut self) -> Result<Move, EngineError> {
        if self.move_history.is_empty() {
            return Err(EngineError::EmptyHistory);
        }
        Ok(self.unmake_move())
    }

    /// Make a move produced by the move generator without checking it.
    pub(crate) fn make_move(&mut self, mv: Move) {
        let piece = self.cells[mv.from.index()].take();
        debug_assert!(
            matches!(piece, Some(p) if p.color() == self.turn),
            "make_move {mv}: no piece of the side to move on the origin"
        );
        debug_assert!(self.is_empty(mv.to), "make_move {mv}: destination occupied");

        if let Some(mid) = mv.captured_square() {
            let victim = self.cells[mid.index()].take();
            debug_assert!(
                matches!(victim, Some(v) if v.color() != self.turn),
                "make_move {mv}: nothing to capture"
            );
            if let Some(victim) = victim {
                self.captured[victim.color().index()].push(victim);
            }
        }

        self.cells[mv.to.index()] = piece;
        self.move_history.push(mv);
        self.position_history.push(self.grid_key());
        self.turn = self.turn.opponent();
    }

    /// Reverse the last `make_move`. History must not be empty.
    pub(crate) fn unmake_move(&mut self) -> Move {
        let mv = self
            .move_history
            .pop()
            .expect("unmake_move called with empty history");
        self.position_history.pop();
        self.turn = self.turn.opponent();

        let piece = self.cells[mv.to.index()].take();
        debug_assert!(piece.is_some(), "unmake_move {mv}: destination empty");
        self.cells[mv.from.index()] = piece;

        if let Some(mid) = mv.captured_square() {
            let victim = self.captured[self.turn.opponent().index()].pop();
            debug_assert!(victim.is_some(), "unmake_move {mv}: captured stack empty");
            self.cells[mid.index()] = victim;
        }
        mv
    }

    /// Make `mv` and return a guard that takes it back when dropped.
    pub fn scoped(&mut self, mv: Move) -> ScopedMove<'_> {
        self.make_move(mv);
        ScopedMove { pos: self }
    }
}

/// A position with one move made on it, undone on drop.
pub struct ScopedMove<'a> {
    pos: &'a mut Position,
}

impl Deref for ScopedMove<'_> {
    type Target = Position;

    fn deref(&self) -> &Position {
        self.pos
    }
}

impl DerefMut for ScopedMove<'_> {
    fn deref_mut(&mut self) -> &mut Position {
        self.pos
    }
}

impl Drop for ScopedMove<'_> {
    fn drop(&mut self) {
        self.pos.unmake_move();
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letters: String = COLUMN_LETTERS.iter().map(|c| format!(" {c}")).collect();
        writeln!(f, "  {letters}")?;
        for row in 0..N {
            write!(f, "{} ", N - row)?;
            for col in 0..N {
                let ch = self
                    .piece_at(Square::new(row, col))
                    .map_or('.', Piece::symbol);
                write!(f, " {ch}")?;
            }
            writeln!(f, "  {}", N - row)?;
        }
        writeln!(f, "  {letters}")?;
        write!(f, "{} to move", self.turn)
    }
}
