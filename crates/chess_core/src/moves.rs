use std::fmt;
use std::str::FromStr;

use crate::{piece::PieceType, ChessError, Position};

#[derive(Debug, Clone, Copy)]
pub struct Move {
    pub from: Position,
    pub to: Position,
    pub move_type: MoveType,
    pub promotion: Option<PieceType>,
}

// Two moves are the same move when they share origin, destination and
// promotion; the move type is bookkeeping filled in by the board.
impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.from == other.from &&
        self.to == other.to &&
        self.promotion == other.promotion
    }
}

impl Eq for Move {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveType {
    Normal,
    Capture,
    EnPassant,
    Castle,
}

impl Move {
    pub fn new(from: Position, to: Position) -> Self {
        Self {
            from,
            to,
            promotion: None,
            move_type: MoveType::Normal,
        }
    }

    pub fn with_promotion(from: Position, to: Position, promotion: PieceType) -> Self {
        Self {
            from,
            to,
            promotion: Some(promotion),
            move_type: MoveType::Normal,
        }
    }

    pub fn castle(from: Position, to: Position) -> Self {
        Self {
            from,
            to,
            promotion: None,
            move_type: MoveType::Castle,
        }
    }

    pub(crate) fn with_type(mut self, move_type: MoveType) -> Self {
        self.move_type = move_type;
        self
    }

    pub fn is_capture(&self) -> bool {
        matches!(self.move_type, MoveType::Capture | MoveType::EnPassant)
    }

    /// Parses long algebraic (UCI) notation such as `e2e4` or `e7e8q`.
    pub fn from_uci(notation: &str) -> Result<Self, ChessError> {
        let invalid = || ChessError::InvalidMove(notation.to_string());

        if !notation.is_ascii() || !(4..=5).contains(&notation.len()) {
            return Err(invalid());
        }

        let from = Position::from_algebraic(&notation[0..2]).ok_or_else(invalid)?;
        let to = Position::from_algebraic(&notation[2..4]).ok_or_else(invalid)?;

        match notation[4..].chars().next() {
            None => Ok(Move::new(from, to)),
            Some(c) => match PieceType::from_char(c) {
                Some(piece) if PieceType::PROMOTIONS.contains(&piece) => {
                    Ok(Move::with_promotion(from, to, piece))
                }
                _ => Err(invalid()),
            },
        }
    }
}

impl FromStr for Move {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Move::from_uci(s)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(piece) = self.promotion {
            write!(f, "{}", piece.to_char())?;
        }
        Ok(())
    }
}
