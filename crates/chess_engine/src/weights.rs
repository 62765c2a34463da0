use chess_core::{piece::{Color, PieceType}, Position};
use once_cell::sync::Lazy;

use crate::evaluation::Score;

/// An 8x8 bonus table written the way a board diagram reads: the first row is
/// rank 8, the last row is rank 1, files run a to h. Values are from White's view.
pub type PieceSquareTable = [[Score; 8]; 8];

// Standard piece values used in chess engines, measured in centipawns (100 = 1 pawn)
const PAWN_VALUE: Score = 100;
const KNIGHT_VALUE: Score = 320;
const BISHOP_VALUE: Score = 330;
const ROOK_VALUE: Score = 500;
const QUEEN_VALUE: Score = 900;
const KING_VALUE: Score = 0;     // Losing the king is handled by the mate sentinels

const MOBILITY_WEIGHT: Score = 10;
const PAWN_SHIELD_BONUS: Score = 15;
const DOUBLED_PAWN_PENALTY: Score = 20;
const ISOLATED_PAWN_PENALTY: Score = 15;

// Pawns: push toward promotion, occupy the centre, keep the king's cover
const PAWN_TABLE: PieceSquareTable = [
    [0,  0,  0,  0,  0,  0,  0,  0],
    [50, 50, 50, 50, 50, 50, 50, 50],
    [10, 10, 20, 30, 30, 20, 10, 10],
    [5,  5, 10, 25, 25, 10,  5,  5],
    [0,  0,  0, 20, 20,  0,  0,  0],
    [5, -5, 10,  0,  0, 10, -5,  5],
    [5, 10,  5,-20,-20,  5, 10,  5],
    [0,  0,  0,  0,  0,  0,  0,  0]
];

// Knights: central squares good, rim squares bad
const KNIGHT_TABLE: PieceSquareTable = [
    [-50,-40,-30,-30,-30,-30,-40,-50],
    [-40,-20,  0,  0,  0,  0,-20,-40],
    [-30,  0, 10, 15, 15, 10,  0,-30],
    [-30,  5, 15, 20, 20, 15,  5,-30],
    [-30,  0, 15, 20, 20, 15,  0,-30],
    [-30,  5, 10, 15, 15, 10,  5,-30],
    [-40,-20,  0,  5,  5,  0,-20,-40],
    [-50,-40,-30,-30,-30,-30,-40,-50]
];

const BISHOP_TABLE: PieceSquareTable = [
    [-20,-10,-10,-10,-10,-10,-10,-20],
    [-10,  0,  0,  0,  0,  0,  0,-10],
    [-10,  0,  5, 10, 10,  5,  0,-10],
    [-10,  5,  5, 10, 10,  5,  5,-10],
    [-10,  0, 10, 10, 10, 10,  0,-10],
    [-10, 10, 10, 10, 10, 10, 10,-10],
    [-10,  5,  0,  0,  0,  0,  5,-10],
    [-20,-10,-10,-10,-10,-10,-10,-20]
];

// Rooks: seventh rank bonus, centre files on the back rank
const ROOK_TABLE: PieceSquareTable = [
    [0,  0,  0,  0,  0,  0,  0,  0],
    [5, 10, 10, 10, 10, 10, 10,  5],
    [-5,  0,  0,  0,  0,  0,  0, -5],
    [-5,  0,  0,  0,  0,  0,  0, -5],
    [-5,  0,  0,  0,  0,  0,  0, -5],
    [-5,  0,  0,  0,  0,  0,  0, -5],
    [-5,  0,  0,  0,  0,  0,  0, -5],
    [0,  0,  0,  5,  5,  0,  0,  0]
];

// The queen and king tables are meant to be read as diagrams like the others.
// Indexed a1-first they come out upside down (a White king on g1 would score
// -40 instead of +30), so keep them rank 8 first.
const QUEEN_TABLE: PieceSquareTable = [
    [-20,-10,-10, -5, -5,-10,-10,-20],
    [-10,  0,  0,  0,  0,  0,  0,-10],
    [-10,  0,  5,  5,  5,  5,  0,-10],
    [-5,  0,  5,  5,  5,  5,  0, -5],
    [0,  0,  5,  5,  5,  5,  0, -5],
    [-10,  5,  5,  5,  5,  5,  0,-10],
    [-10,  0,  5,  0,  0,  0,  0,-10],
    [-20,-10,-10, -5, -5,-10,-10,-20]
];

// King: stay home behind the pawns, corners after castling
const KING_TABLE: PieceSquareTable = [
    [-30,-40,-40,-50,-50,-40,-40,-30],
    [-30,-40,-40,-50,-50,-40,-40,-30],
    [-30,-40,-40,-50,-50,-40,-40,-30],
    [-30,-40,-40,-50,-50,-40,-40,-30],
    [-20,-30,-30,-40,-40,-30,-30,-20],
    [-10,-20,-20,-20,-20,-20,-20,-10],
    [20, 20,  0,  0,  0,  0, 20, 20],
    [20, 30, 10,  0,  0, 10, 30, 20]
];

/// Weights shared by every evaluator that does not bring its own
pub static DEFAULT_WEIGHTS: Lazy<EvaluationWeights> = Lazy::new(EvaluationWeights::default);

/// Every constant the evaluator multiplies by. Built once, then only read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationWeights {
    /// Indexed by [`PieceType::index`]
    pub piece_values: [Score; 6],
    /// Indexed by [`PieceType::index`]
    pub piece_square_tables: [PieceSquareTable; 6],
    pub mobility: Score,
    pub pawn_shield: Score,
    pub doubled_pawn: Score,
    pub isolated_pawn: Score,
}

impl Default for EvaluationWeights {
    fn default() -> Self {
        Self {
            piece_values: [PAWN_VALUE, KNIGHT_VALUE, BISHOP_VALUE, ROOK_VALUE, QUEEN_VALUE, KING_VALUE],
            piece_square_tables: [PAWN_TABLE, KNIGHT_TABLE, BISHOP_TABLE, ROOK_TABLE, QUEEN_TABLE, KING_TABLE],
            mobility: MOBILITY_WEIGHT,
            pawn_shield: PAWN_SHIELD_BONUS,
            doubled_pawn: DOUBLED_PAWN_PENALTY,
            isolated_pawn: ISOLATED_PAWN_PENALTY,
        }
    }
}

impl EvaluationWeights {
    pub fn piece_value(&self, piece_type: PieceType) -> Score {
        self.piece_values[piece_type.index()]
    }

    /// Table bonus for a piece standing on `pos`. Black reads the table through
    /// the vertically mirrored square.
    pub fn square_bonus(&self, piece_type: PieceType, pos: Position, color: Color) -> Score {
        let pos = match color {
            Color::White => pos,
            Color::Black => pos.mirror(),
        };
        let row = 8 - pos.rank as usize;
        let column = pos.file as usize - 1;
        self.piece_square_tables[piece_type.index()][row][column]
    }
}
