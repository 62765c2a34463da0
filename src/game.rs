use std::{
    fmt,
    io::{self, BufRead, Write},
    path::PathBuf,
    time::Duration,
};

use anyhow::{anyhow, Context};
use chess_core::{Board, Color, Move, Outcome};
use chess_engine::{normalize_promotion, Bot, BotWorker, ChooseMove, MinimaxBot, RandomBot, UciEngine};

use crate::cli::PlayerKind;

/// Everything needed to set up a game
#[derive(Debug, Clone)]
pub struct MatchConfig {
    pub white: PlayerKind,
    pub black: PlayerKind,
    pub depth: u8,
    pub engine: PathBuf,
    pub movetime: Duration,
    pub max_plies: usize,
    pub fen: Option<String>,
    pub seed: Option<u64>,
    pub show_board: bool,
}

impl MatchConfig {
    fn player(&self, kind: PlayerKind, color: Color) -> anyhow::Result<Player> {
        let bot = match kind {
            PlayerKind::Human => return Ok(Player::Human),
            PlayerKind::Random => {
                let rng_bot = match self.seed {
                    // Different streams for the two sides
                    Some(seed) => RandomBot::with_seed(seed.wrapping_add(color as u64)),
                    None => RandomBot::new(),
                };
                Bot::Random(rng_bot)
            }
            PlayerKind::Minimax => Bot::Minimax(MinimaxBot::new(self.depth)),
            PlayerKind::Uci => {
                let engine = UciEngine::open(&self.engine, self.movetime)
                    .with_context(|| format!("starting UCI engine {}", self.engine.display()))?;
                Bot::External(engine)
            }
        };
        Ok(Player::Bot(bot))
    }
}

#[derive(Debug)]
pub enum Player {
    Human,
    Bot(Bot),
}

/// Why the game stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchEnd {
    Finished(Outcome),
    /// The side to move had nothing to play: a human quit or a bot gave up
    NoMove { side: Color },
    PlyLimit,
}

#[derive(Debug, Clone)]
pub struct MatchResult {
    pub end: MatchEnd,
    pub moves: Vec<Move>,
    pub final_fen: String,
}

impl MatchResult {
    /// PGN style score
    pub fn score(&self) -> &'static str {
        let winner = match self.end {
            MatchEnd::Finished(outcome) => match outcome.winner() {
                Some(color) => color,
                None => return "1/2-1/2",
            },
            MatchEnd::NoMove { side } => side.opposite(),
            MatchEnd::PlyLimit => return "*",
        };
        match winner {
            Color::White => "1-0",
            Color::Black => "0-1",
        }
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            MatchEnd::Finished(outcome) => write!(f, "{}", outcome)?,
            MatchEnd::NoMove { side } => write!(f, "{} stopped playing", side)?,
            MatchEnd::PlyLimit => write!(f, "stopped after {} plies", self.moves.len())?,
        }
        write!(f, " ({})", self.score())
    }
}

/// One game on the authoritative board
pub struct Match<R> {
    board: Board,
    white: Option<Player>,
    black: Option<Player>,
    max_plies: usize,
    show_board: bool,
    input: R,
}

impl<R: BufRead> Match<R> {
    /// Sets up the board and both players. Human moves are read from `input`.
    pub fn new(config: &MatchConfig, input: R) -> anyhow::Result<Self> {
        let board = match &config.fen {
            Some(fen) => Board::from_fen(fen)?,
            None => Board::new(),
        };
        let white = config.player(config.white, Color::White)?;
        let black = config.player(config.black, Color::Black)?;

        Ok(Self {
            board,
            white: Some(white),
            black: Some(black),
            max_plies: config.max_plies,
            show_board: config.show_board,
            input,
        })
    }

    /// Plays until the game ends, a player stops, or the ply limit is hit.
    /// External engines are shut down before returning, also on error.
    pub fn play(mut self) -> anyhow::Result<MatchResult> {
        let mut moves = Vec::new();
        let end = self.run(&mut moves);
        self.close_players();
        let end = end?;

        if self.show_board {
            println!("{}", self.board);
        }
        Ok(MatchResult {
            end,
            moves,
            final_fen: self.board.to_fen(),
        })
    }

    fn run(&mut self, moves: &mut Vec<Move>) -> anyhow::Result<MatchEnd> {
        loop {
            if let Some(outcome) = self.board.outcome() {
                return Ok(MatchEnd::Finished(outcome));
            }
            if moves.len() >= self.max_plies {
                return Ok(MatchEnd::PlyLimit);
            }
            if self.show_board {
                println!("{}", self.board);
            }

            let side = self.board.current_turn();
            let Some(mv) = self.next_move(side)? else {
                return Ok(MatchEnd::NoMove { side });
            };
            let number = self.board.fullmove_number();
            self.board.make_move(mv)?;
            log::info!("{}. {} plays {}", number, side, mv);
            moves.push(mv);
        }
    }

    fn seat(&mut self, side: Color) -> &mut Option<Player> {
        match side {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    fn next_move(&mut self, side: Color) -> anyhow::Result<Option<Move>> {
        match self.seat(side).take() {
            Some(Player::Human) => {
                *self.seat(side) = Some(Player::Human);
                self.read_human_move(side)
            }
            Some(Player::Bot(bot)) => {
                let reply = BotWorker::spawn(bot, &self.board).wait()?;
                log::debug!("{} answered in {:?}", reply.bot.name(), reply.elapsed);
                *self.seat(side) = Some(Player::Bot(reply.bot));
                Ok(reply.result?)
            }
            None => Err(anyhow!("{} has no player", side)),
        }
    }

    /// Reads UCI moves until one is legal. `quit` or end of input stops the game.
    fn read_human_move(&mut self, side: Color) -> anyhow::Result<Option<Move>> {
        loop {
            print!("{} to move: ", side);
            io::stdout().flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            let text = line.trim();
            match text {
                "" => continue,
                "quit" | "resign" => return Ok(None),
                _ => {}
            }

            let mv = match Move::from_uci(text) {
                Ok(mv) => normalize_promotion(&self.board, mv),
                Err(err) => {
                    println!("{}", err);
                    continue;
                }
            };
            if self.board.legal_moves().contains(&mv) {
                return Ok(Some(mv));
            }
            println!("illegal move {}", mv);
        }
    }

    fn close_players(&mut self) {
        for player in [self.white.take(), self.black.take()].into_iter().flatten() {
            if let Player::Bot(bot) = player {
                let name = bot.name().to_string();
                if let Err(err) = bot.close() {
                    log::warn!("closing {} failed: {}", name, err);
                }
            }
        }
    }
}
