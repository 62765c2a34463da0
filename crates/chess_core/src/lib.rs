// Rules engine: board representation, legal move generation and game-end detection
pub mod board;
pub mod error;
pub mod piece;
pub mod position;
pub mod moves;

// Re-export main types for convenience
pub use board::{Board, CastlingRights, Outcome, START_FEN};
pub use error::ChessError;
pub use piece::{Piece, Color, PieceType};
pub use position::Position;
pub use moves::{Move, MoveType};
