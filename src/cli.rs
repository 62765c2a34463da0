use std::{path::PathBuf, time::Duration};

use clap::{Parser, ValueEnum};
use chess_engine::{DEFAULT_DEPTH, DEFAULT_MOVETIME};

use crate::game::MatchConfig;

/// Who sits on one side of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlayerKind {
    /// Moves typed on stdin in UCI notation
    Human,
    /// Uniformly random legal moves
    Random,
    /// Alpha-beta minimax at --depth
    Minimax,
    /// External UCI engine at --engine
    Uci,
}

#[derive(Parser, Debug)]
#[command(name = "chess-bots", version, about = "Play chess between humans, bots and UCI engines")]
pub struct Cli {
    /// Player for White
    #[arg(long, value_enum, default_value_t = PlayerKind::Human)]
    pub white: PlayerKind,

    /// Player for Black
    #[arg(long, value_enum, default_value_t = PlayerKind::Minimax)]
    pub black: PlayerKind,

    /// Search depth of the minimax bot in plies
    #[arg(long, default_value_t = DEFAULT_DEPTH, value_parser = clap::value_parser!(u8).range(1..=8))]
    pub depth: u8,

    /// UCI engine binary used by `uci` players
    #[arg(long, default_value = "stockfish")]
    pub engine: PathBuf,

    /// Thinking time per move for the UCI engine, in milliseconds
    #[arg(long, default_value_t = DEFAULT_MOVETIME.as_millis() as u64)]
    pub movetime_ms: u64,

    /// Stop the game after this many plies
    #[arg(long, default_value_t = 500)]
    pub max_plies: usize,

    /// Start from this position instead of the initial one
    #[arg(long)]
    pub fen: Option<String>,

    /// Seed for random players
    #[arg(long)]
    pub seed: Option<u64>,

    /// Only log warnings and do not print the board
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            white: self.white,
            black: self.black,
            depth: self.depth,
            engine: self.engine.clone(),
            movetime: Duration::from_millis(self.movetime_ms),
            max_plies: self.max_plies,
            fen: self.fen.clone(),
            seed: self.seed,
            show_board: !self.quiet,
        }
    }
}
