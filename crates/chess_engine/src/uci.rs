use std::{fmt, path::Path, time::Duration};

use chess_core::{Board, Move};
use stockfish::Stockfish;

use crate::{bot::ChooseMove, error::EngineError};

/// Thinking time handed to the engine with every search
pub const DEFAULT_MOVETIME: Duration = Duration::from_secs(2);

/// The conversation with a running engine process
pub(crate) trait EngineSession: Send {
    fn set_position(&mut self, fen: &str) -> Result<(), EngineError>;

    /// Searches the current position and returns the raw `bestmove` text
    fn search(&mut self, movetime: Duration) -> Result<String, EngineError>;

    fn shut_down(self: Box<Self>);
}

impl EngineSession for Stockfish {
    fn set_position(&mut self, fen: &str) -> Result<(), EngineError> {
        self.set_fen_position(fen).map_err(engine_error)
    }

    fn search(&mut self, movetime: Duration) -> Result<String, EngineError> {
        // Both clocks get the budget, the engine only reads the one to move
        let budget = movetime.as_millis().try_into().ok();
        let output = self.go_based_on_times(budget, budget).map_err(engine_error)?;
        Ok(output.best_move().to_string())
    }

    fn shut_down(self: Box<Self>) {
        let mut engine = *self;
        let outcome = engine.quit();
        log::debug!("engine quit: {:?}", outcome);
    }
}

fn engine_error(err: impl fmt::Display) -> EngineError {
    EngineError::Engine(err.to_string())
}

/// A running UCI engine.
///
/// The handle owns the engine process. Call [`UciEngine::close`] to shut the
/// engine down and log it; a handle dropped unclosed quits the engine as well.
pub struct UciEngine {
    name: String,
    session: Option<Box<dyn EngineSession>>,
    movetime: Duration,
}

impl UciEngine {
    /// Starts the engine binary at `path` and completes the UCI handshake
    pub fn open(path: impl AsRef<Path>, movetime: Duration) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let program = path
            .to_str()
            .ok_or_else(|| EngineError::Engine(format!("engine path {} is not UTF-8", path.display())))?;
        let engine = Stockfish::new(program).map_err(engine_error)?;

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("UCI engine"));
        log::info!("{} ready", name);

        Ok(Self {
            name,
            session: Some(Box::new(engine)),
            movetime,
        })
    }

    #[cfg(test)]
    fn from_session(name: &str, session: Box<dyn EngineSession>, movetime: Duration) -> Self {
        Self {
            name: name.to_string(),
            session: Some(session),
            movetime,
        }
    }

    pub fn movetime(&self) -> Duration {
        self.movetime
    }

    /// Asks the engine for its move in `board`.
    ///
    /// `Ok(None)` when the engine reports no move. A reply that is not legal in
    /// `board` is an error, never played blindly.
    pub fn best_move(&mut self, board: &Board) -> Result<Option<Move>, EngineError> {
        let session = self.session.as_mut().ok_or(EngineError::EngineExited)?;
        let fen = board.to_fen();
        log::trace!("{} <- position fen {}", self.name, fen);
        session.set_position(&fen)?;

        let reply = session.search(self.movetime)?;
        log::trace!("{} -> bestmove {}", self.name, reply);
        resolve_reply(board, &reply)
    }

    /// Sends `quit` and lets the engine exit
    pub fn close(mut self) -> Result<(), EngineError> {
        if let Some(session) = self.session.take() {
            session.shut_down();
            log::info!("{} closed", self.name);
        }
        Ok(())
    }
}

/// Turns the text of a `bestmove` reply into a legal move of `board`
fn resolve_reply(board: &Board, reply: &str) -> Result<Option<Move>, EngineError> {
    let reply = reply.trim();
    match reply {
        "" => return Err(EngineError::MalformedBestMove(reply.to_string())),
        "(none)" | "0000" => return Ok(None),
        _ => {}
    }

    let suggested = Move::from_uci(reply).map_err(|_| EngineError::MalformedBestMove(reply.to_string()))?;
    board
        .legal_moves()
        .into_iter()
        .find(|legal| *legal == suggested)
        .map(Some)
        .ok_or_else(|| EngineError::IllegalEngineMove(reply.to_string()))
}

impl ChooseMove for UciEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_move(&mut self, board: &Board) -> Result<Option<Move>, EngineError> {
        self.best_move(board)
    }
}

impl fmt::Debug for UciEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UciEngine")
            .field("name", &self.name)
            .field("running", &self.session.is_some())
            .field("movetime", &self.movetime)
            .finish()
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            log::debug!("quitting unclosed engine {}", self.name);
            session.shut_down();
        }
    }
}
