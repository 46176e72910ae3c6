//! Zobrist hashing for transposition table lookups.
//!
//! Keys are drawn from a seeded generator owned by the searcher, so a given
//! seed always produces the same hashes and searches are reproducible.

use crate::board::Color;
use crate::constants::SQUARES;
use crate::position::Position;

#[derive(Clone, Debug)]
pub struct ZobristKeys {
    piece_square: [[u64; SQUARES]; 2],
    side_to_move: u64,
}

impl ZobristKeys {
    pub fn new(seed: u64) -> Self {
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut piece_square = [[0u64; SQUARES]; 2];
        for color in &mut piece_square {
            for key in color.iter_mut() {
                *key = rng.u64(..);
            }
        }
        Self {
            piece_square,
            side_to_move: rng.u64(..),
        }
    }

    /// Key of a piece of `color` on the square with index `idx`.
    #[inline]
    pub fn piece_key(&self, color: Color, idx: usize) -> u64 {
        self.piece_square[color.index()][idx]
    }

    /// Full hash of the position: pieces plus side to move.
    pub fn hash(&self, pos: &Position) -> u64 {
        let mut key = pos
            .pieces()
            .fold(0u64, |acc, (sq, piece)| acc ^ self.piece_key(piece.color(), sq.index()));
        if pos.turn() == Color::Black {
            key ^= self.side_to_move;
        }
        key
    }
}
