use std::path::PathBuf;

use anyhow::Context as _;
use flapnet_engine::{FieldConfig, Seed, SoloGame};
use flapnet_training::{
    best::{BestStore as _, JsonFileStore},
    config::TrainingConfig,
};

use crate::{command::BestPathArg, util};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AutoPlayArg {
    #[clap(flatten)]
    best: BestPathArg,
    /// Training configuration file whose field settings are used
    #[arg(long)]
    config: Option<PathBuf>,
    /// Stop after this many ticks even if the bird is still alive
    #[arg(long, default_value_t = 100_000)]
    max_ticks: u64,
    /// Seed of the pipe stream (32 hex digits); random if omitted
    #[arg(long)]
    seed: Option<Seed>,
}

pub(crate) fn run(arg: &AutoPlayArg) -> anyhow::Result<()> {
    let AutoPlayArg {
        best,
        config,
        max_ticks,
        seed,
    } = arg;

    let field = match config {
        Some(path) => util::read_json_file::<TrainingConfig>("training config", path)?.field,
        None => FieldConfig::default(),
    };
    field.validate()?;

    let record = JsonFileStore::new(&best.best_path)
        .load()?
        .with_context(|| {
            format!(
                "No best controller stored at {}",
                best.best_path.display()
            )
        })?;
    let seed = seed.unwrap_or_else(rand::random);
    eprintln!(
        "Playing best controller (score {}, generation {}) with seed {seed}",
        record.score, record.generation
    );

    let mut game = SoloGame::new(field, seed);
    let mut score = 0;
    while game.state().is_playing() && game.stream().tick() < *max_ticks {
        game.tick_with(&record.controller);
        if game.score() > score {
            score = game.score();
            log::debug!("passed pipe #{score} at tick {}", game.stream().tick());
        }
    }

    let ticks = game.stream().tick();
    if game.state().is_game_over() {
        eprintln!("Game over after {ticks} ticks");
    } else {
        eprintln!("Stopped at tick limit ({ticks} ticks)");
    }
    eprintln!("  Score: {}", game.score());
    Ok(())
}
