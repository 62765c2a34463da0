// Move selection: static evaluation, alpha-beta search and the bots built on them
pub mod bot;
pub mod error;
pub mod evaluation;
pub mod search;
pub mod uci;
pub mod weights;
pub mod worker;

// Re-export main types for convenience
pub use bot::{Bot, ChooseMove, MinimaxBot, RandomBot};
pub use error::EngineError;
pub use evaluation::{evaluate_position, EvaluationBreakdown, Evaluator, Score, BLACK_MATES, MATE_SCORE, WHITE_MATES};
pub use search::{normalize_promotion, search_best_move, SearchStats, Searcher, DEFAULT_DEPTH};
pub use uci::{UciEngine, DEFAULT_MOVETIME};
pub use weights::{EvaluationWeights, DEFAULT_WEIGHTS};
pub use worker::{BotWorker, WorkerReply};
