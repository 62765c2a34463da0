use chess_core::ChessError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine failed: {0}")]
    Engine(String),

    #[error("engine is no longer running")]
    EngineExited,

    #[error("malformed bestmove reply `{0}`")]
    MalformedBestMove(String),

    #[error("engine suggested illegal move `{0}`")]
    IllegalEngineMove(String),

    #[error("bot worker hung up without a reply")]
    WorkerDisconnected,

    #[error(transparent)]
    Chess(#[from] ChessError),
}
