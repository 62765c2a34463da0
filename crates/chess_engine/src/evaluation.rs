use chess_core::{Board, Piece, piece::{PieceType, Color}};

use crate::weights::{EvaluationWeights, DEFAULT_WEIGHTS};

/// Centipawn score, positive when White stands better
pub type Score = i32;

/// Magnitude of a mate score. Far outside anything the heuristic terms can add
/// up to, so a mate always dominates.
pub const MATE_SCORE: Score = 100_000;
pub const WHITE_MATES: Score = MATE_SCORE;
pub const BLACK_MATES: Score = -MATE_SCORE;

/// The five heuristic terms of a non-terminal position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluationBreakdown {
    pub material: Score,
    pub positional: Score,
    pub mobility: Score,
    pub king_safety: Score,
    pub pawn_structure: Score,
}

impl EvaluationBreakdown {
    pub fn total(&self) -> Score {
        self.material + self.positional + self.mobility + self.king_safety + self.pawn_structure
    }
}

/// Static evaluator. Holds nothing but a reference to its weights, so it is
/// cheap to copy into every search.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'w> {
    weights: &'w EvaluationWeights,
}

impl Default for Evaluator<'static> {
    fn default() -> Self {
        Self::new(&DEFAULT_WEIGHTS)
    }
}

impl<'w> Evaluator<'w> {
    pub fn new(weights: &'w EvaluationWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &'w EvaluationWeights {
        self.weights
    }

    /// Scores a position from White's perspective
    pub fn evaluate(&self, board: &Board) -> Score {
        match self.terminal_score(board) {
            Some(score) => score,
            None => self.breakdown(board).total(),
        }
    }

    /// Mate and dead-draw scores, or `None` when the heuristic terms apply
    pub fn terminal_score(&self, board: &Board) -> Option<Score> {
        if board.is_checkmate() {
            // The side to move is the side that got mated
            return Some(match board.current_turn() {
                Color::White => BLACK_MATES,
                Color::Black => WHITE_MATES,
            });
        }
        if board.is_stalemate() || board.has_insufficient_material() {
            return Some(0);
        }
        None
    }

    pub fn breakdown(&self, board: &Board) -> EvaluationBreakdown {
        EvaluationBreakdown {
            material: self.material(board),
            positional: self.positional(board),
            mobility: self.mobility(board),
            king_safety: self.king_safety(board),
            pawn_structure: self.pawn_structure(board),
        }
    }

    pub fn material(&self, board: &Board) -> Score {
        board
            .pieces()
            .map(|(_, piece)| signed(piece.color, self.weights.piece_value(piece.piece_type)))
            .sum()
    }

    pub fn positional(&self, board: &Board) -> Score {
        board
            .pieces()
            .map(|(pos, piece)| {
                signed(piece.color, self.weights.square_bonus(piece.piece_type, pos, piece.color))
            })
            .sum()
    }

    /// Difference in legal move counts, each side counted as if it were to move
    pub fn mobility(&self, board: &Board) -> Score {
        let white_moves = board.legal_moves_for(Color::White).len() as Score;
        let black_moves = board.legal_moves_for(Color::Black).len() as Score;
        self.weights.mobility * (white_moves - black_moves)
    }

    /// Bonus for own pawns on the three squares directly in front of the king
    pub fn king_safety(&self, board: &Board) -> Score {
        [Color::White, Color::Black]
            .into_iter()
            .map(|color| {
                let Some(king) = board.king_position(color) else {
                    return 0;
                };
                let own_pawn = Some(Piece::new(PieceType::Pawn, color));
                let shield = (-1..=1)
                    .filter_map(|file_step| king.offset(file_step, color.forward()))
                    .filter(|&pos| board.get_piece(pos) == own_pawn)
                    .count() as Score;
                signed(color, self.weights.pawn_shield * shield)
            })
            .sum()
    }

    /// Doubled and isolated pawn penalties; a penalty counts against its own side
    pub fn pawn_structure(&self, board: &Board) -> Score {
        let white_penalty = self.pawn_penalty(board, Color::White);
        let black_penalty = self.pawn_penalty(board, Color::Black);
        black_penalty - white_penalty
    }

    fn pawn_penalty(&self, board: &Board, color: Color) -> Score {
        // Padded by one empty file on each side so neighbours never go out of range
        let mut pawns_per_file = [0 as Score; 10];
        for (pos, piece) in board.pieces() {
            if piece.piece_type == PieceType::Pawn && piece.color == color {
                pawns_per_file[pos.file as usize] += 1;
            }
        }

        let mut penalty = 0;
        for file in 1..=8 {
            let count = pawns_per_file[file];
            if count > 1 {
                penalty += self.weights.doubled_pawn * (count - 1);
            }
            if count > 0 && pawns_per_file[file - 1] == 0 && pawns_per_file[file + 1] == 0 {
                penalty += self.weights.isolated_pawn * count;
            }
        }
        penalty
    }
}

/// Evaluates a position with the default weights, positive scores favour White
pub fn evaluate_position(board: &Board) -> Score {
    Evaluator::default().evaluate(board)
}

fn signed(color: Color, value: Score) -> Score {
    match color {
        Color::White => value,
        Color::Black => -value,
    }
}
