use chess_core::{Board, Move};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::{
    error::EngineError,
    evaluation::Evaluator,
    search::{Searcher, DEFAULT_DEPTH},
    uci::UciEngine,
    weights::{EvaluationWeights, DEFAULT_WEIGHTS},
};

/// Anything that can pick a move for the side to move
pub trait ChooseMove {
    fn name(&self) -> &str;

    /// `Ok(None)` means the player has nothing to play (no legal moves)
    fn choose_move(&mut self, board: &Board) -> Result<Option<Move>, EngineError>;
}

/// Plays a uniformly random legal move
#[derive(Debug, Clone)]
pub struct RandomBot {
    rng: StdRng,
}

impl RandomBot {
    pub fn new() -> Self {
        Self { rng: StdRng::from_entropy() }
    }

    /// Same seed, same sequence of choices
    pub fn with_seed(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl Default for RandomBot {
    fn default() -> Self {
        Self::new()
    }
}

impl ChooseMove for RandomBot {
    fn name(&self) -> &str {
        "Random"
    }

    fn choose_move(&mut self, board: &Board) -> Result<Option<Move>, EngineError> {
        Ok(board.legal_moves().choose(&mut self.rng).copied())
    }
}

/// Alpha-beta minimax at a fixed depth
#[derive(Debug, Clone)]
pub struct MinimaxBot {
    depth: u8,
    weights: &'static EvaluationWeights,
}

impl MinimaxBot {
    pub fn new(depth: u8) -> Self {
        Self::with_weights(depth, &DEFAULT_WEIGHTS)
    }

    pub fn with_weights(depth: u8, weights: &'static EvaluationWeights) -> Self {
        Self { depth: depth.max(1), weights }
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }
}

impl Default for MinimaxBot {
    fn default() -> Self {
        Self::new(DEFAULT_DEPTH)
    }
}

impl ChooseMove for MinimaxBot {
    fn name(&self) -> &str {
        "Minimax"
    }

    fn choose_move(&mut self, board: &Board) -> Result<Option<Move>, EngineError> {
        // Search a private copy so the caller's board is never touched
        let mut scratch = board.clone();
        let mut searcher = Searcher::new(Evaluator::new(self.weights));
        let best = searcher.best_move(&mut scratch, self.depth);

        let stats = searcher.stats();
        log::debug!(
            "minimax depth {} picked {:?} (score {:?}, {} nodes)",
            self.depth,
            best.map(|mv| mv.to_string()),
            stats.best_score,
            stats.nodes,
        );
        Ok(best)
    }
}

/// The players a match can seat
#[derive(Debug)]
pub enum Bot {
    Random(RandomBot),
    Minimax(MinimaxBot),
    External(UciEngine),
}

impl Bot {
    /// Releases whatever the bot holds. Only an external engine holds anything.
    pub fn close(self) -> Result<(), EngineError> {
        match self {
            Bot::External(engine) => engine.close(),
            Bot::Random(_) | Bot::Minimax(_) => Ok(()),
        }
    }
}

impl ChooseMove for Bot {
    fn name(&self) -> &str {
        match self {
            Bot::Random(bot) => bot.name(),
            Bot::Minimax(bot) => bot.name(),
            Bot::External(engine) => engine.name(),
        }
    }

    fn choose_move(&mut self, board: &Board) -> Result<Option<Move>, EngineError> {
        match self {
            Bot::Random(bot) => bot.choose_move(board),
            Bot::Minimax(bot) => bot.choose_move(board),
            Bot::External(engine) => engine.choose_move(board),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::search_best_move;

    #[test]
    fn random_bot_plays_legal_moves() {
        let mut board = Board::new();
        let mut bot = RandomBot::with_seed(7);
        for _ in 0..40 {
            let Some(mv) = bot.choose_move(&board).unwrap() else {
                break;
            };
            assert!(board.legal_moves().contains(&mv));
            board.make_move(mv).unwrap();
        }
    }

    #[test]
    fn random_bot_is_reproducible_with_a_seed() {
        let board = Board::new();
        let picks = |seed| {
            let mut bot = RandomBot::with_seed(seed);
            (0..10).map(|_| bot.choose_move(&board).unwrap()).collect::<Vec<_>>()
        };
        assert_eq!(picks(42), picks(42));
    }

    #[test]
    fn random_bot_passes_when_mated() {
        let mated = Board::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3").unwrap();
        assert_eq!(RandomBot::with_seed(1).choose_move(&mated).unwrap(), None);
    }

    #[test]
    fn minimax_bot_matches_the_search_and_leaves_the_board_alone() {
        let board = Board::from_fen("4k3/8/8/3q4/8/8/3Q4/4K3 w - - 0 1").unwrap();
        let before = board.clone();

        let mut bot = Bot::Minimax(MinimaxBot::new(2));
        let chosen = bot.choose_move(&board).unwrap();

        let mut scratch = board.clone();
        assert_eq!(chosen, search_best_move(&mut scratch, 2));
        assert_eq!(board, before);
        assert_eq!(bot.name(), "Minimax");
        bot.close().unwrap();
    }

    #[test]
    fn minimax_bot_never_searches_zero_plies() {
        assert_eq!(MinimaxBot::new(0).depth(), 1);
        assert_eq!(MinimaxBot::default().depth(), DEFAULT_DEPTH);
    }
}
