/// An 8x8 grid of optional pieces, plus its wire encodings and terminal rendering.
pub mod board;
/// A move from one square to another, and the textual move grammar.
pub mod moves;
/// Enums for piece kinds, colors, and a struct for a chess piece.
pub mod piece;
/// Squares on a chessboard, addressed by zero-based row and column.
pub mod square;

pub use board::*;
pub use moves::*;
pub use piece::*;
pub use square::*;

/// Re-exports all the things you'll need.
pub mod prelude {
    pub use crate::board::*;
    pub use crate::moves::*;
    pub use crate::piece::*;
    pub use crate::square::*;
}
