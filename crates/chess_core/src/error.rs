use thiserror::Error;

use crate::Move;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChessError {
    #[error("invalid FEN `{fen}`: {reason}")]
    InvalidFen { fen: String, reason: &'static str },

    #[error("invalid move notation `{0}`")]
    InvalidMove(String),

    #[error("illegal move {0} in this position")]
    IllegalMove(Move),

    #[error("no move to undo")]
    NothingToUndo,
}
