mod cli;
mod game;

use std::io;

use clap::Parser;

use cli::Cli;
use game::Match;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let config = cli.match_config();
    log::info!("{:?} (White) against {:?} (Black)", config.white, config.black);

    let game = Match::new(&config, io::stdin().lock())?;
    let result = game.play()?;

    println!("{}", result);
    println!("{}", result.final_fen);
    Ok(())
}
