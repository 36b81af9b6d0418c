use std::path::PathBuf;

use anyhow::Context as _;
use flapnet_training::best::{BestStore as _, JsonFileStore};

use crate::{command::BestPathArg, util::Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ShowBestArg {
    #[clap(flatten)]
    best: BestPathArg,
    /// Write the record to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &ShowBestArg) -> anyhow::Result<()> {
    let ShowBestArg { best, output } = arg;

    let record = JsonFileStore::new(&best.best_path)
        .load()?
        .with_context(|| {
            format!(
                "No best controller stored at {}",
                best.best_path.display()
            )
        })?;

    eprintln!("Best controller: {}", best.best_path.display());
    eprintln!("  Score: {}", record.score);
    eprintln!("  Generation: {}", record.generation);
    match record.trained_at {
        Some(trained_at) => eprintln!("  Trained at: {trained_at}"),
        None => eprintln!("  Trained at: unknown"),
    }
    eprintln!("  Hidden units: {}", record.controller.hidden_size());
    eprintln!("  Parameters: {}", record.controller.parameter_count());

    Output::from_output_path(output.as_deref())?.write_json(&record)?;
    Ok(())
}
