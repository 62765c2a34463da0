use chess_core::{Board, Color, Move, PieceType};
use chess_engine::{
    normalize_promotion, search::{INFINITY, NEG_INFINITY}, search_best_move, Evaluator, Score, Searcher,
    BLACK_MATES, WHITE_MATES,
};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

fn board(fen: &str) -> Board {
    Board::from_fen(fen).expect("valid FEN")
}

fn uci(notation: &str) -> Move {
    Move::from_uci(notation).expect("valid move")
}

/// Plain minimax without any pruning, the reference the search must agree with
fn full_minimax(evaluator: &Evaluator, board: &mut Board, depth: u8, maximizing: bool) -> Score {
    if depth == 0 || board.is_game_over() {
        return evaluator.evaluate(board);
    }
    let mut values = Vec::new();
    for mv in board.legal_moves() {
        let mv = normalize_promotion(board, mv);
        board.push_move(mv).unwrap();
        values.push(full_minimax(evaluator, board, depth - 1, !maximizing));
        board.undo_move().unwrap();
    }
    if maximizing {
        values.into_iter().max().unwrap()
    } else {
        values.into_iter().min().unwrap()
    }
}

/// Root choice from unpruned values, keeping the first of equal moves
fn full_best_move(board: &mut Board, depth: u8) -> Option<Move> {
    let evaluator = Evaluator::default();
    let maximizing = board.current_turn() == Color::White;
    let mut best: Option<(Move, Score)> = None;
    for mv in board.legal_moves() {
        let mv = normalize_promotion(board, mv);
        board.push_move(mv).unwrap();
        let score = full_minimax(&evaluator, board, depth - 1, !maximizing);
        board.undo_move().unwrap();
        let better = match best {
            None => true,
            Some((_, current)) => if maximizing { score > current } else { score < current },
        };
        if better {
            best = Some((mv, score));
        }
    }
    best.map(|(mv, _)| mv)
}

/// Positions reached by seeded random play from the start
fn random_positions(count: u64, plies: usize) -> Vec<Board> {
    (0..count)
        .filter_map(|seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut board = Board::new();
            for _ in 0..plies {
                let moves = board.legal_moves();
                let mv = *moves.choose(&mut rng)?;
                board.make_move(mv).unwrap();
            }
            (!board.is_game_over()).then_some(board)
        })
        .collect()
}

#[test]
fn pruning_never_changes_the_minimax_value() {
    let evaluator = Evaluator::default();
    let mut positions = random_positions(6, 12);
    positions.push(board(KIWIPETE));
    positions.push(board("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1"));

    for mut position in positions {
        let maximizing = position.current_turn() == Color::White;
        let expected = full_minimax(&evaluator, &mut position, 2, maximizing);
        let mut searcher = Searcher::default();
        let pruned = searcher.minimax(&mut position, 2, NEG_INFINITY, INFINITY, maximizing);
        assert_eq!(pruned, expected, "value differs in {}", position.to_fen());
    }
}

#[test]
fn pruning_never_changes_the_root_choice() {
    let mut start = Board::new();
    assert_eq!(search_best_move(&mut start.clone(), 3), full_best_move(&mut start, 3));

    for mut position in random_positions(4, 20) {
        let expected = full_best_move(&mut position, 2);
        assert_eq!(search_best_move(&mut position, 2), expected, "choice differs in {}", position.to_fen());
    }
}

#[test]
fn pruning_skips_work() {
    let mut start = Board::new();
    let mut searcher = Searcher::default();
    searcher.best_move(&mut start, 3);
    let stats = searcher.stats();
    assert!(stats.cutoffs > 0);
    // Unpruned depth 3 from the start evaluates 8902 leaves
    assert!(stats.leaves < 8902);
}

#[test]
fn search_is_deterministic() {
    let mut first = board(KIWIPETE);
    let mut second = board(KIWIPETE);
    assert_eq!(search_best_move(&mut first, 2), search_best_move(&mut second, 2));

    let mut searcher = Searcher::default();
    let again = searcher.best_move(&mut first, 2);
    let first_stats = searcher.stats();
    assert_eq!(searcher.best_move(&mut first, 2), again);
    assert_eq!(searcher.stats(), first_stats);
}

#[test]
fn search_restores_the_board() {
    for fen in [KIWIPETE, "8/4P3/8/8/8/8/k7/7K w - - 0 1", "r3k2r/8/8/8/3pP3/8/8/R3K2R b KQkq e3 0 1"] {
        let mut position = board(fen);
        let before = position.clone();
        search_best_move(&mut position, 3);
        assert_eq!(position, before);
        assert_eq!(position.to_fen(), fen);
    }
}

#[test]
fn opening_move_at_depth_one() {
    let mut start = Board::new();
    let mv = search_best_move(&mut start, 1).unwrap();

    assert!(start.legal_moves().contains(&mv));
    let piece = start.get_piece(mv.from).unwrap();
    let double_push = piece.piece_type == PieceType::Pawn && mv.to.rank == 4;
    assert!(double_push || piece.piece_type == PieceType::Knight, "unexpected {}", mv);
    assert_eq!(mv, uci("e2e4"));
}

#[test]
fn takes_a_free_queen() {
    let mut white = board("4k3/8/8/3q4/8/8/3Q4/4K3 w - - 0 1");
    assert_eq!(search_best_move(&mut white, 1), Some(uci("d2d5")));

    let mut black = board("4k3/3q4/8/8/3Q4/8/8/4K3 b - - 0 1");
    assert_eq!(search_best_move(&mut black, 1), Some(uci("d7d4")));
}

#[test]
fn finds_mate_in_one() {
    for depth in 1..=2 {
        let mut white = board("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1");
        assert_eq!(search_best_move(&mut white, depth), Some(uci("a1a8")));

        let mut black = board("r5k1/8/8/8/8/8/5PPP/6K1 b - - 0 1");
        assert_eq!(search_best_move(&mut black, depth), Some(uci("a8a1")));
    }

    let mut searcher = Searcher::default();
    searcher.best_move(&mut board("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1"), 1);
    assert_eq!(searcher.stats().best_score, Some(WHITE_MATES));
    searcher.best_move(&mut board("r5k1/8/8/8/8/8/5PPP/6K1 b - - 0 1"), 1);
    assert_eq!(searcher.stats().best_score, Some(BLACK_MATES));
}

#[test]
fn promotes_to_a_queen() {
    let mut position = board("8/4P3/8/8/8/8/k7/7K w - - 0 1");
    let mv = search_best_move(&mut position, 2).unwrap();
    assert_eq!(mv, uci("e7e8q"));
    assert_eq!(mv.promotion, Some(PieceType::Queen));
}
