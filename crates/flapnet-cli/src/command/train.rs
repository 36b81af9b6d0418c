use std::path::PathBuf;

use flapnet_engine::Seed;
use flapnet_training::{
    best::JsonFileStore, config::TrainingConfig, summary::GenerationSummary, trainer::Trainer,
};

use crate::{command::BestPathArg, util};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Training configuration file (JSON format); defaults are used if omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of generations to run
    #[arg(long, default_value_t = 100)]
    generations: u64,
    #[clap(flatten)]
    best: BestPathArg,
    /// Seed of the training run (32 hex digits); random if omitted
    #[arg(long)]
    seed: Option<Seed>,
    /// Evaluate each generation on worker threads
    #[arg(long, default_value_t = false)]
    parallel: bool,
    /// Start from the stored best controller
    #[arg(long, default_value_t = false)]
    resume: bool,
    /// Write one JSON summary per generation to this file
    #[arg(long)]
    summary: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        config,
        generations,
        best,
        seed,
        parallel,
        resume,
        summary: summary_path,
    } = arg;

    let mut config: TrainingConfig = match config {
        Some(path) => util::read_json_file("training config", path)?,
        None => TrainingConfig::default(),
    };
    config.seed_from_best |= *resume;
    let seed = seed.unwrap_or_else(rand::random);

    eprintln!("Training seed: {seed}");
    eprintln!(
        "Population: {} controllers, {} hidden units, scoring: {:?}",
        config.ga.pop_size, config.ga.hidden_size, config.scoring
    );

    let store = JsonFileStore::new(&best.best_path);
    let mut trainer = Trainer::new(config, seed, store)?;
    if let Some(record) = trainer.best() {
        eprintln!("Best score so far: {}", record.score);
    }

    let mut summary_output = summary_path
        .as_deref()
        .map(util::Output::create)
        .transpose()?;

    for _ in 0..*generations {
        let summary = if *parallel {
            trainer.run_generation_parallel()
        } else {
            trainer.run_generation()
        };
        print_summary(&summary);
        if let Some(output) = &mut summary_output {
            output.write_json_line(&summary)?;
        }
    }

    eprintln!();
    eprintln!("Training completed after {} generations", trainer.generation());
    match trainer.best() {
        Some(record) => {
            eprintln!("  Best score: {}", record.score);
            eprintln!("  Found in generation: {}", record.generation);
            if let Some(trained_at) = record.trained_at {
                eprintln!("  Trained at: {trained_at}");
            }
            eprintln!("  Path: {}", best.best_path.display());
        }
        None => eprintln!("  No controller passed a pipe"),
    }
    Ok(())
}

fn print_summary(summary: &GenerationSummary) {
    let GenerationSummary {
        generation,
        ticks,
        retired,
        fitness,
        best_score,
        new_best,
        elapsed,
    } = summary;
    let marker = if *new_best { " (new best)" } else { "" };
    eprintln!("Generation #{generation}: {ticks} ticks in {elapsed:.2?}");
    eprintln!(
        "  Fitness: min={} max={} mean={:.2} median={} std_dev={:.2}",
        fitness.min, fitness.max, fitness.mean, fitness.median, fitness.std_dev
    );
    if *retired > 0 {
        eprintln!("  Retired at tick cap: {retired}");
    }
    eprintln!("  Best score: {best_score}{marker}");
}
