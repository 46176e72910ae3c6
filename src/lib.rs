//! Fianco-rs: a Fianco playing engine.
//!
//! Fianco is played on a 9x9 board. Pieces step forward or sideways and
//! capture by jumping diagonally forward over an opposing piece; a side wins
//! by reaching the far row, by eliminating or immobilising the opponent.
//!
//! ## Modules
//!
//! - [`constants`] - Board geometry, evaluation terms, and search defaults
//! - [`board`] - Colors, pieces, squares, moves, and coordinate notation
//! - [`position`] - Board state, make/unmake, and history
//! - [`movegen`] - Move generation and capture policy
//! - [`rules`] - Win, loss, and repetition detection
//! - [`eval`] - Static evaluation
//! - [`zobrist`] / [`tt`] - Position hashing and the transposition table
//! - [`search`] - Iterative-deepening alpha-beta search
//! - [`protocol`] - Text command protocol
//!
//! ## Example
//!
//! ```
//! use fianco_rs::position::Position;
//! use fianco_rs::search::Searcher;
//!
//! let mut pos = Position::new();
//! pos.apply_move("d4-d5".parse().unwrap()).unwrap();
//!
//! let mut searcher = Searcher::default();
//! let reply = searcher.choose_move(&mut pos, 2).unwrap();
//! println!("Black plays {reply}");
//! ```

pub mod board;
pub mod constants;
pub mod error;
pub mod eval;
pub mod movegen;
pub mod position;
pub mod protocol;
pub mod rules;
pub mod search;
pub mod tt;
pub mod zobrist;

pub use error::EngineError;
