//! Board primitives: colors, pieces, squares, moves, and coordinate notation.
//!
//! Squares are addressed by `(row, col)` with row 0 at the top (Black's home
//! row) and row 8 at the bottom (White's home row). In notation columns are
//! the letters `a`..`i` and rows are numbered `9 - row`, so White's home row
//! is rank 1 and Black's is rank 9.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::constants::{CENTER_MAX, CENTER_MIN, COLUMN_LETTERS, N};
use crate::error::EngineError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const ALL: [Color; 2] = [Color::White, Color::Black];

    #[inline]
    pub fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Evaluation multiplier: `+1` for White, `-1` for Black.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Color::White => 1.0,
            Color::Black => -1.0,
        }
    }

    /// Row step of a forward move. White advances towards row 0.
    #[inline]
    pub fn forward(self) -> isize {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    /// Row a piece of this color must reach to win.
    #[inline]
    pub fn goal_row(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => N - 1,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

/// A Fianco piece. All pieces are alike apart from their color.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    color: Color,
}

impl Piece {
    pub fn new(color: Color) -> Self {
        Self { color }
    }

    #[inline]
    pub fn color(self) -> Color {
        self.color
    }

    #[inline]
    pub fn sign(self) -> f64 {
        self.color.sign()
    }

    /// Signed material value.
    #[inline]
    pub fn value(self) -> f64 {
        crate::constants::PIECE_VALUE * self.sign()
    }

    /// Diagram character: `W` or `B`.
    pub fn symbol(self) -> char {
        match self.color {
            Color::White => 'W',
            Color::Black => 'B',
        }
    }
}

/// A cell of the 9x9 board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    row: u8,
    col: u8,
}

impl Square {
    /// Create a square. Both coordinates must be below `N`.
    #[inline]
    pub fn new(row: usize, col: usize) -> Self {
        debug_assert!(row < N && col < N, "square ({row}, {col}) off the board");
        Self {
            row: row as u8,
            col: col as u8,
        }
    }

    /// Create a square from signed coordinates, or `None` when off the board.
    #[inline]
    pub fn try_new(row: isize, col: isize) -> Option<Self> {
        if (0..N as isize).contains(&row) && (0..N as isize).contains(&col) {
            Some(Self::new(row as usize, col as usize))
        } else {
            None
        }
    }

    #[inline]
    pub fn from_index(idx: usize) -> Self {
        Self::new(idx / N, idx % N)
    }

    #[inline]
    pub fn row(self) -> usize {
        self.row as usize
    }

    #[inline]
    pub fn col(self) -> usize {
        self.col as usize
    }

    /// Index into a row-major array of `N * N` cells.
    #[inline]
    pub fn index(self) -> usize {
        self.row() * N + self.col()
    }

    /// The square `(dr, dc)` away, if it is on the board.
    #[inline]
    pub fn offset(self, dr: isize, dc: isize) -> Option<Self> {
        Self::try_new(self.row as isize + dr, self.col as isize + dc)
    }

    /// Whether the square lies in the central 4x4 block.
    #[inline]
    pub fn is_central(self) -> bool {
        (CENTER_MIN..=CENTER_MAX).contains(&self.row())
            && (CENTER_MIN..=CENTER_MAX).contains(&self.col())
    }

    /// All squares in row-major order.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..N * N).map(Square::from_index)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", COLUMN_LETTERS[self.col()], N - self.row())
    }
}

impl FromStr for Square {
    type Err = EngineError;

    /// Parse `e5`-style coordinates (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || EngineError::MalformedNotation(s.to_string());
        let mut chars = s.trim().chars();
        let letter = chars.next().ok_or_else(malformed)?.to_ascii_lowercase();
        let col = COLUMN_LETTERS
            .iter()
            .position(|&c| c == letter)
            .ok_or_else(malformed)?;
        let rank: usize = chars.as_str().parse().map_err(|_| malformed())?;
        if !(1..=N).contains(&rank) {
            return Err(malformed());
        }
        Ok(Square::new(N - rank, col))
    }
}

/// A move of one piece. Equality only looks at the two squares.
#[derive(Copy, Clone, Debug)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub capture: bool,
}

impl Move {
    pub fn translation(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            capture: false,
        }
    }

    pub fn jump(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            capture: true,
        }
    }

    /// Square of the piece removed by a capture.
    #[inline]
    pub fn captured_square(&self) -> Option<Square> {
        self.capture.then(|| {
            Square::new(
                (self.from.row() + self.to.row()) / 2,
                (self.from.col() + self.to.col()) / 2,
            )
        })
    }
}

impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.from == other.from && self.to == other.to
    }
}

impl Eq for Move {}

impl Hash for Move {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.from.hash(state);
        self.to.hash(state);
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = if self.capture { 'x' } else { '-' };
        write!(f, "{}{sep}{}", self.from, self.to)
    }
}

impl FromStr for Move {
    type Err = EngineError;

    /// Parse `d4-d5` or `d4xf6`. A space also separates the two squares.
    ///
    /// The capture flag is inferred from the distance travelled; whether the
    /// move is legal is decided by the position it is applied to.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let (from, to) = text
            .split_once(['-', 'x', 'X', ' '])
            .ok_or_else(|| EngineError::MalformedNotation(s.to_string()))?;
        let from: Square = from.parse()?;
        let to: Square = to.trim().parse()?;
        let capture = from.row().abs_diff(to.row()) == 2 && from.col().abs_diff(to.col()) == 2;
        Ok(Move { from, to, capture })
    }
}
