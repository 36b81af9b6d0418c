use std::path::PathBuf;

use clap::{Parser, Subcommand};

use self::{auto_play::AutoPlayArg, show_best::ShowBestArg, train::TrainArg};

mod auto_play;
mod show_best;
mod train;

const DEFAULT_BEST_PATH: &str = "./best_ga.json";

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Evolve controllers with the genetic algorithm
    Train(#[clap(flatten)] TrainArg),
    /// Fly the best stored controller through a fresh pipe stream
    #[command(name = "auto-play")]
    AutoPlay(#[clap(flatten)] AutoPlayArg),
    /// Print the best stored controller
    ShowBest(#[clap(flatten)] ShowBestArg),
}

/// Location of the best controller record, shared by every mode.
#[derive(Debug, Clone, clap::Args)]
struct BestPathArg {
    /// Path of the best controller record (JSON format)
    #[arg(long, default_value = DEFAULT_BEST_PATH)]
    best_path: PathBuf,
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::AutoPlay(arg) => auto_play::run(&arg)?,
        Mode::ShowBest(arg) => show_best::run(&arg)?,
    }
    Ok(())
}
