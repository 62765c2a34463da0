use std::time::Instant;

use chess_core::{Board, Move, piece::{Color, PieceType}};

use crate::evaluation::{Evaluator, Score};

/// Search window bounds, symmetric around zero
pub const INFINITY: Score = Score::MAX;
pub const NEG_INFINITY: Score = -Score::MAX;

pub const DEFAULT_DEPTH: u8 = 3;

/// Counters for one root search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,        // minimax calls, root children included
    pub leaves: u64,       // positions handed to the evaluator
    pub cutoffs: u64,      // nodes that stopped early on beta <= alpha
    pub best_score: Option<Score>,
}

/// Fixed-depth alpha-beta minimax. White maximizes, Black minimizes.
///
/// The board is searched in place: every move applied during the search is
/// undone before the call returns, so the caller gets its board back unchanged.
#[derive(Debug, Clone)]
pub struct Searcher<'w> {
    evaluator: Evaluator<'w>,
    stats: SearchStats,
}

impl Default for Searcher<'static> {
    fn default() -> Self {
        Self::new(Evaluator::default())
    }
}

impl<'w> Searcher<'w> {
    pub fn new(evaluator: Evaluator<'w>) -> Self {
        Self {
            evaluator,
            stats: SearchStats::default(),
        }
    }

    /// Statistics of the most recent [`Searcher::best_move`] call
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Picks the move with the best minimax score for the side to move.
    ///
    /// Every root move gets a full-window search, so the chosen move is the
    /// exact minimax choice. Ties keep the move generated first. Returns `None`
    /// when there are no legal moves; a depth of 0 searches one ply.
    pub fn best_move(&mut self, board: &mut Board, depth: u8) -> Option<Move> {
        self.stats = SearchStats::default();
        let started = Instant::now();
        let depth = depth.max(1);
        let maximizing = board.current_turn() == Color::White;

        let mut best: Option<(Move, Score)> = None;
        for mv in board.legal_moves() {
            let mv = normalize_promotion(board, mv);
            if let Err(err) = board.push_move(mv) {
                log::warn!("skipping root move {}: {}", mv, err);
                continue;
            }
            let score = self.minimax(board, depth - 1, NEG_INFINITY, INFINITY, !maximizing);
            revert(board);

            let improves = match best {
                None => true,
                Some((_, best_score)) if maximizing => score > best_score,
                Some((_, best_score)) => score < best_score,
            };
            if improves {
                best = Some((mv, score));
            }
        }

        self.stats.best_score = best.map(|(_, score)| score);
        log::debug!(
            "depth {} search for {}: best {:?}, {} nodes, {} leaves, {} cutoffs in {:?}",
            depth,
            board.current_turn(),
            best.map(|(mv, score)| (mv.to_string(), score)),
            self.stats.nodes,
            self.stats.leaves,
            self.stats.cutoffs,
            started.elapsed(),
        );

        best.map(|(mv, _)| mv)
    }

    /// Alpha-beta minimax value of `board` searched `depth` plies deep.
    /// With a full window the result equals plain minimax; pruning only skips work.
    pub fn minimax(&mut self, board: &mut Board, depth: u8, mut alpha: Score, mut beta: Score, maximizing: bool) -> Score {
        self.stats.nodes += 1;

        if depth == 0 || board.is_game_over() {
            self.stats.leaves += 1;
            return self.evaluator.evaluate(board);
        }

        let mut best = if maximizing { NEG_INFINITY } else { INFINITY };
        for mv in board.legal_moves() {
            let mv = normalize_promotion(board, mv);
            if let Err(err) = board.push_move(mv) {
                log::warn!("skipping move {}: {}", mv, err);
                continue;
            }
            let score = self.minimax(board, depth - 1, alpha, beta, !maximizing);
            revert(board);

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(best);
            } else {
                best = best.min(score);
                beta = beta.min(best);
            }

            // Remaining siblings cannot change the result
            if beta <= alpha {
                self.stats.cutoffs += 1;
                break;
            }
        }
        best
    }
}

/// Searches with the default weights and returns the best move for the side to move
pub fn search_best_move(board: &mut Board, depth: u8) -> Option<Move> {
    Searcher::default().best_move(board, depth)
}

/// A pawn move onto the last rank that names no promotion piece promotes to a queen
pub fn normalize_promotion(board: &Board, mut mv: Move) -> Move {
    if mv.promotion.is_none() {
        if let Some(piece) = board.get_piece(mv.from) {
            if piece.piece_type == PieceType::Pawn && mv.to.rank == piece.color.promotion_rank() {
                mv.promotion = Some(PieceType::Queen);
            }
        }
    }
    mv
}

fn revert(board: &mut Board) {
    if let Err(err) = board.undo_move() {
        log::error!("search lost track of its moves: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::evaluate_position;
    use chess_core::Position;

    fn sq(name: &str) -> Position {
        Position::from_algebraic(name).unwrap()
    }

    #[test]
    fn normalizes_bare_promotions_to_queen() {
        let board = Board::from_fen("8/4P3/8/8/8/8/3p4/k6K w - - 0 1").unwrap();

        let bare = Move::new(sq("e7"), sq("e8"));
        assert_eq!(normalize_promotion(&board, bare).promotion, Some(PieceType::Queen));

        let underpromotion = Move::with_promotion(sq("e7"), sq("e8"), PieceType::Knight);
        assert_eq!(normalize_promotion(&board, underpromotion), underpromotion);

        // Black pawn heading for rank 1
        let black_push = Move::new(sq("d2"), sq("d1"));
        assert_eq!(normalize_promotion(&board, black_push).promotion, Some(PieceType::Queen));

        // Kings and ordinary pushes are left alone
        let king_move = Move::new(sq("h1"), sq("g1"));
        assert_eq!(normalize_promotion(&board, king_move).promotion, None);
    }

    #[test]
    fn depth_zero_is_static_evaluation() {
        let mut board = Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1").unwrap();
        let expected = evaluate_position(&board);
        let mut searcher = Searcher::default();
        assert_eq!(searcher.minimax(&mut board, 0, NEG_INFINITY, INFINITY, true), expected);
        assert_eq!(searcher.minimax(&mut board, 0, NEG_INFINITY, INFINITY, false), expected);
    }

    #[test]
    fn no_legal_moves_means_no_move() {
        let mut mated = Board::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3").unwrap();
        assert_eq!(search_best_move(&mut mated, 3), None);

        let mut stalemate = Board::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(search_best_move(&mut stalemate, 2), None);
    }

    #[test]
    fn depth_zero_request_searches_one_ply() {
        let mut board = Board::from_fen("4k3/8/8/3q4/8/8/3Q4/4K3 w - - 0 1").unwrap();
        assert_eq!(search_best_move(&mut board, 0), Some(Move::new(sq("d2"), sq("d5"))));
    }

    #[test]
    fn stats_are_reset_per_search() {
        let mut board = Board::new();
        let mut searcher = Searcher::default();
        searcher.best_move(&mut board, 2);
        let first = searcher.stats();
        searcher.best_move(&mut board, 2);
        assert_eq!(searcher.stats(), first);
        // 20 root children, each with at most 20 replies
        assert!(first.nodes > 20);
        assert!(first.leaves > 0 && first.leaves <= 400);
        assert!(first.best_score.is_some());
    }
}
