use std::time::{Duration, Instant};

use chess_core::{Board, Move};
use crossbeam_channel::{bounded, Receiver, TryRecvError};

use crate::{
    bot::{Bot, ChooseMove},
    error::EngineError,
};

/// What a finished worker hands back: the bot itself and its answer
#[derive(Debug)]
pub struct WorkerReply {
    pub bot: Bot,
    pub result: Result<Option<Move>, EngineError>,
    pub elapsed: Duration,
}

/// A bot thinking on a rayon thread about its own copy of the board
#[derive(Debug)]
pub struct BotWorker {
    receiver: Receiver<WorkerReply>,
}

impl BotWorker {
    /// Moves `bot` onto the rayon pool together with a clone of `board`
    pub fn spawn(bot: Bot, board: &Board) -> Self {
        let (sender, receiver) = bounded(1);
        let board = board.clone();

        rayon::spawn(move || {
            let mut bot = bot;
            let started = Instant::now();
            let result = bot.choose_move(&board);
            let reply = WorkerReply {
                bot,
                result,
                elapsed: started.elapsed(),
            };
            if sender.send(reply).is_err() {
                log::debug!("bot worker finished after its owner went away");
            }
        });

        Self { receiver }
    }

    /// The reply if the bot has finished, `Ok(None)` while it is still thinking
    pub fn try_finish(&self) -> Result<Option<WorkerReply>, EngineError> {
        match self.receiver.try_recv() {
            Ok(reply) => Ok(Some(reply)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(EngineError::WorkerDisconnected),
        }
    }

    /// Blocks until the bot has answered
    pub fn wait(self) -> Result<WorkerReply, EngineError> {
        self.receiver.recv().map_err(|_| EngineError::WorkerDisconnected)
    }
}
