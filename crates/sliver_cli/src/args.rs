use crate::add::AddArgs;
use crate::hash::HashArgs;
use crate::normalise::NormaliseArgs;
use crate::realise::RealiseArgs;
use clap::{Parser, Subcommand};

#[derive(Parser, Clone, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(short, long)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Command {
    /// Import a term file into the store and print its id.
    Add(AddArgs),
    /// Fingerprint a filesystem subtree.
    Hash(HashArgs),
    /// Drive an expression to its normal form.
    Normalise(NormaliseArgs),
    /// Normalise an expression and install its slice.
    Realise(RealiseArgs),
}
