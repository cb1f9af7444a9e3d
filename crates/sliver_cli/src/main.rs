mod add;
mod args;
mod hash;
mod logger;
mod normalise;
mod realise;

use add::add_cli;
use anyhow::Result;
use args::{Args, Command};
use clap::Parser;
use hash::hash_cli;
use log::LevelFilter;
use logger::Logger;
use normalise::normalise_cli;
use realise::realise_cli;

fn main() -> Result<()> {
    // The engine is strictly sequential; a single-threaded runtime is all
    // it needs.
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(cli())
}

fn setup_logging() {
    if log::set_logger(&Logger).is_err() {
        eprintln!("Unable to set logger, proceeding without one");
    } else {
        log::set_max_level(LevelFilter::Debug);
    }
}

async fn cli() -> Result<()> {
    let args = Args::parse();
    if args.verbose {
        setup_logging();
    }
    match args.command {
        Command::Add(args) => add_cli(args).await,
        Command::Hash(args) => hash_cli(args).await,
        Command::Normalise(args) => normalise_cli(args).await,
        Command::Realise(args) => realise_cli(args).await,
    }
}
