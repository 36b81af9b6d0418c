use std::time::Instant;

use flapnet_engine::{Bird, Pipe, Seed};

use crate::{
    best::{BestRecord, BestStore},
    config::{ConfigError, TrainingConfig},
    population::PopulationManager,
    run::{Evaluation, GenerationRun, evaluate_parallel},
    summary::{FitnessStats, GenerationSummary},
};

/// Result of [`Trainer::tick`].
#[derive(Debug, Clone, PartialEq, derive_more::IsVariant)]
pub enum TickOutcome {
    Running,
    /// The last bird died; the next generation has already started.
    GenerationFinished(GenerationSummary),
}

/// Drives training generation after generation.
///
/// A trainer owns the [`PopulationManager`], the [`BestStore`] the best
/// controller is persisted to, and the [`GenerationRun`] in progress. It can
/// be stepped tick by tick (for a front end that draws every frame) or a whole
/// generation at a time.
///
/// The stored best record is loaded on construction. A missing, unreadable or
/// malformed record is logged and training starts without one. Saving a new
/// best is best-effort: a failure is logged and training continues.
///
/// # Example
///
/// ```
/// use flapnet_engine::Seed;
/// use flapnet_training::{best::MemoryStore, config::TrainingConfig, trainer::Trainer};
///
/// let mut config = TrainingConfig::default();
/// config.ga.pop_size = 8;
/// config.max_ticks_per_generation = Some(500);
///
/// let store = MemoryStore::new();
/// let mut trainer = Trainer::new(config, Seed::from_u128(0), &store).unwrap();
/// let summary = trainer.run_generation();
/// assert_eq!(summary.generation, 0);
/// assert_eq!(trainer.generation(), 1);
/// assert_eq!(store.get().map(|best| best.score), trainer.best().map(|best| best.score));
/// ```
#[derive(Debug)]
pub struct Trainer<S> {
    config: TrainingConfig,
    manager: PopulationManager,
    store: S,
    run: GenerationRun,
    started_at: Instant,
}

impl<S> Trainer<S>
where
    S: BestStore,
{
    pub fn new(config: TrainingConfig, seed: Seed, store: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut manager = PopulationManager::new(config.ga.clone(), seed)?;

        match store.load() {
            Ok(Some(record)) => {
                log::info!(
                    "loaded best controller (score {}, generation {})",
                    record.score,
                    record.generation
                );
                manager.restore_best(record);
            }
            Ok(None) => log::debug!("no stored best controller"),
            Err(e) => log::warn!("ignoring stored best controller: {e}"),
        }
        if config.seed_from_best {
            if manager.seed_population_from_best() {
                log::info!("seeded initial population with the best controller");
            } else {
                log::debug!("no compatible best controller to seed the population with");
            }
        }

        let run = start_run(&config, &mut manager);
        Ok(Self {
            config,
            manager,
            store,
            run,
            started_at: Instant::now(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn manager(&self) -> &PopulationManager {
        &self.manager
    }

    /// The generation in progress.
    #[must_use]
    pub fn run(&self) -> &GenerationRun {
        &self.run
    }

    #[must_use]
    pub fn birds(&self) -> &[Bird] {
        self.run.birds()
    }

    #[must_use]
    pub fn pipes(&self) -> &[Pipe] {
        self.run.pipes()
    }

    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.run.alive_count()
    }

    /// Index of the generation in progress.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.manager.generation()
    }

    #[must_use]
    pub fn best(&self) -> Option<&BestRecord> {
        self.manager.best()
    }

    #[must_use]
    pub fn best_score(&self) -> u32 {
        self.manager.best_score()
    }

    /// Ticks elapsed in the generation in progress.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.run.tick_count()
    }

    /// Highest fitness in the generation in progress.
    #[must_use]
    pub fn max_fitness(&self) -> u32 {
        self.run.max_fitness()
    }

    /// Advances the current generation by one tick, rolling over to the next
    /// generation when the last bird dies.
    pub fn tick(&mut self) -> TickOutcome {
        if self.run.tick().is_running() {
            return TickOutcome::Running;
        }
        let evaluation = self.run.evaluation();
        TickOutcome::GenerationFinished(self.complete_generation(evaluation))
    }

    /// Runs the current generation to its end.
    pub fn run_generation(&mut self) -> GenerationSummary {
        loop {
            if let TickOutcome::GenerationFinished(summary) = self.tick() {
                return summary;
            }
        }
    }

    /// Evaluates the current generation on worker threads.
    ///
    /// Each bird replays the generation's stream on its own, which only gives
    /// the lock-step result under per-agent scoring. Under shared scoring the
    /// generation is run in lock-step instead.
    pub fn run_generation_parallel(&mut self) -> GenerationSummary {
        if !self.config.scoring.is_per_agent() {
            log::warn!("shared scoring cannot be evaluated in parallel; running in lock-step");
            return self.run_generation();
        }
        let evaluation = evaluate_parallel(
            &self.config.field,
            self.config.max_ticks_per_generation,
            self.run.controllers(),
            self.run.seed(),
        );
        self.complete_generation(evaluation)
    }

    /// Restarts the generation in progress from its first tick, with the same
    /// controllers and the same pipe stream.
    pub fn reset(&mut self) {
        self.run = GenerationRun::new(
            self.config.field.clone(),
            self.config.scoring,
            self.config.max_ticks_per_generation,
            self.run.controllers().to_vec(),
            self.run.seed(),
        );
        self.started_at = Instant::now();
    }

    fn complete_generation(&mut self, evaluation: Evaluation) -> GenerationSummary {
        let Evaluation {
            individuals,
            ticks,
            retired,
        } = evaluation;
        let fitness = FitnessStats::new(individuals.iter().map(|ind| ind.fitness()))
            .expect("population is never empty");

        let outcome = self.manager.evaluate_and_evolve(individuals);
        if outcome.new_best
            && let Some(best) = self.manager.best()
        {
            log::info!(
                "new best score {} in generation {}",
                best.score,
                best.generation
            );
            if let Err(e) = self.store.save(best) {
                log::warn!("failed to persist best controller: {e}");
            }
        }

        let summary = GenerationSummary {
            generation: outcome.generation,
            ticks,
            retired,
            fitness,
            best_score: self.manager.best_score(),
            new_best: outcome.new_best,
            elapsed: self.started_at.elapsed(),
        };
        log::debug!(
            "generation {} finished after {} ticks: max={} mean={:.2} retired={}",
            summary.generation,
            summary.ticks,
            summary.fitness.max,
            summary.fitness.mean,
            summary.retired
        );

        self.run = start_run(&self.config, &mut self.manager);
        self.started_at = Instant::now();
        summary
    }
}

fn start_run(config: &TrainingConfig, manager: &mut PopulationManager) -> GenerationRun {
    let seed = manager.next_stream_seed();
    GenerationRun::new(
        config.field.clone(),
        config.scoring,
        config.max_ticks_per_generation,
        manager.population().to_vec(),
        seed,
    )
}

#[cfg(test)]
mod tests {
    use std::fs;

    use flapnet_engine::{FieldConfig, ScoringMode};
    use flapnet_network::Controller;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::{
        best::{JsonFileStore, MemoryStore, StoreError},
        config::GaConfig,
    };

    /// Never-flapping birds in a weightless field pass one pipe every 10
    /// ticks after the first 49.
    fn open_config(pop_size: usize) -> TrainingConfig {
        TrainingConfig {
            field: FieldConfig {
                gravity: 0.0,
                pipe_gap: 300.0,
                pipe_speed: 10.0,
                spawn_interval_ticks: 10,
                gap_center_min: 300,
                gap_center_max: 300,
                ..FieldConfig::default()
            },
            ga: GaConfig {
                pop_size,
                hidden_size: 2,
                ..GaConfig::default()
            },
            max_ticks_per_generation: Some(100),
            ..TrainingConfig::default()
        }
    }

    fn small_config() -> TrainingConfig {
        TrainingConfig {
            ga: GaConfig {
                pop_size: 6,
                hidden_size: 4,
                ..GaConfig::default()
            },
            max_ticks_per_generation: Some(300),
            ..TrainingConfig::default()
        }
    }

    fn record(score: u32, hidden: usize) -> BestRecord {
        BestRecord {
            controller: Controller::random(hidden, &mut Pcg32::seed_from_u64(1)),
            score,
            generation: 0,
            trained_at: None,
        }
    }

    struct FailingStore;

    impl BestStore for FailingStore {
        fn load(&self) -> Result<Option<BestRecord>, StoreError> {
            Err(StoreError::Io {
                path: "unreadable".into(),
                source: std::io::Error::other("load failed"),
            })
        }

        fn save(&self, _record: &BestRecord) -> Result<(), StoreError> {
            Err(StoreError::Io {
                path: "unwritable".into(),
                source: std::io::Error::other("save failed"),
            })
        }
    }

    #[test]
    fn test_tick_rolls_over_generation() {
        let mut trainer =
            Trainer::new(small_config(), Seed::from_u128(1), MemoryStore::new()).unwrap();
        let mut ticks = 0;
        let summary = loop {
            ticks += 1;
            if let TickOutcome::GenerationFinished(summary) = trainer.tick() {
                break summary;
            }
            assert!(trainer.alive_count() > 0);
        };
        assert_eq!(summary.generation, 0);
        assert_eq!(summary.ticks, ticks);
        assert_eq!(trainer.generation(), 1);
        // the next generation starts fresh
        assert_eq!(trainer.tick_count(), 0);
        assert_eq!(trainer.alive_count(), 6);
        assert!(trainer.pipes().is_empty());
    }

    #[test]
    fn test_new_best_is_persisted() {
        let store = MemoryStore::new();
        let mut trainer = Trainer::new(open_config(4), Seed::from_u128(2), &store).unwrap();
        // random controllers may die early, but the best score only grows
        let mut best_scores = vec![];
        for _ in 0..5 {
            let summary = trainer.run_generation();
            best_scores.push(summary.best_score);
            assert_eq!(store.get().map_or(0, |best| best.score), summary.best_score);
        }
        assert!(best_scores.is_sorted());
    }

    #[test]
    fn test_persistence_failure_is_swallowed() {
        let mut trainer = Trainer::new(open_config(3), Seed::from_u128(3), FailingStore).unwrap();
        assert!(trainer.best().is_none());
        for generation in 0..3 {
            assert_eq!(trainer.run_generation().generation, generation);
        }
        assert_eq!(trainer.generation(), 3);
    }

    #[test]
    fn test_loads_stored_best() {
        let store = MemoryStore::with_record(record(40, 2));
        let mut trainer = Trainer::new(open_config(3), Seed::from_u128(4), &store).unwrap();
        assert_eq!(trainer.best_score(), 40);
        // at most 6 pipes can be passed within the tick cap
        let summary = trainer.run_generation();
        assert!(!summary.new_best);
        assert_eq!(summary.best_score, 40);
        assert_eq!(store.get().unwrap().score, 40);
    }

    #[test]
    fn test_seed_from_best_injects_controller() {
        let stored = record(5, 2);
        let config = TrainingConfig {
            seed_from_best: true,
            ..open_config(3)
        };
        let trainer = Trainer::new(
            config.clone(),
            Seed::from_u128(5),
            MemoryStore::with_record(stored.clone()),
        )
        .unwrap();
        assert_eq!(trainer.run().controllers()[0], stored.controller);

        // a controller of another width is left out
        let wide = record(5, 7);
        let trainer =
            Trainer::new(config, Seed::from_u128(5), MemoryStore::with_record(wide)).unwrap();
        assert_eq!(trainer.run().controllers()[0].hidden_size(), 2);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_no_best() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best.json");
        fs::write(&path, "{\"w1\": 3").unwrap();
        let store = JsonFileStore::new(&path);
        let mut trainer = Trainer::new(open_config(3), Seed::from_u128(6), &store).unwrap();
        assert!(trainer.best().is_none());
        assert_eq!(trainer.run_generation().generation, 0);
    }

    #[test]
    fn test_legacy_file_loads_with_zero_score() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best.json");
        fs::write(
            &path,
            r#"{"w1": [[0.0, 0.0, 0.0], [0.0, 0.0, 0.0]], "b1": [0.0, 0.0],
                "w2": [0.0, 0.0], "b2": -10.0, "hidden": 2}"#,
        )
        .unwrap();
        let config = TrainingConfig {
            seed_from_best: true,
            ..open_config(3)
        };
        let mut trainer =
            Trainer::new(config, Seed::from_u128(7), JsonFileStore::new(&path)).unwrap();
        assert_eq!(trainer.best_score(), 0);

        // the legacy controller never flaps and passes 6 pipes before the cap
        let summary = trainer.run_generation();
        assert_eq!(summary.fitness.max, 6);
        assert!(summary.new_best);
        let saved = JsonFileStore::new(&path).load().unwrap().unwrap();
        assert_eq!(saved.score, 6);
        assert_eq!(saved.generation, 0);
        assert!(saved.trained_at.is_some());
    }

    #[test]
    fn test_reset_replays_generation() {
        let mut trainer =
            Trainer::new(small_config(), Seed::from_u128(8), MemoryStore::new()).unwrap();
        let controllers = trainer.run().controllers().to_vec();
        let seed = trainer.run().seed();
        for _ in 0..20 {
            trainer.tick();
        }
        trainer.reset();
        assert_eq!(trainer.tick_count(), 0);
        assert_eq!(trainer.generation(), 0);
        assert_eq!(trainer.run().controllers(), controllers.as_slice());
        assert_eq!(trainer.run().seed(), seed);
    }

    #[test]
    fn test_parallel_generation_matches_lock_step() {
        let mut lock_step =
            Trainer::new(small_config(), Seed::from_u128(9), MemoryStore::new()).unwrap();
        let mut parallel =
            Trainer::new(small_config(), Seed::from_u128(9), MemoryStore::new()).unwrap();
        for _ in 0..3 {
            let a = lock_step.run_generation();
            let b = parallel.run_generation_parallel();
            assert_eq!(a.fitness, b.fitness);
            assert_eq!(a.ticks, b.ticks);
            assert_eq!(a.best_score, b.best_score);
        }
        assert_eq!(
            lock_step.manager().population(),
            parallel.manager().population()
        );
    }

    #[test]
    fn test_parallel_falls_back_under_shared_scoring() {
        let config = TrainingConfig {
            scoring: ScoringMode::SharedFirstCrossing,
            ..open_config(3)
        };
        let mut trainer = Trainer::new(config, Seed::from_u128(10), MemoryStore::new()).unwrap();
        let summary = trainer.run_generation_parallel();
        assert_eq!(summary.generation, 0);
        assert_eq!(trainer.generation(), 1);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = TrainingConfig {
            ga: GaConfig {
                elite_frac: 2.0,
                ..GaConfig::default()
            },
            ..TrainingConfig::default()
        };
        assert!(Trainer::new(config, Seed::from_u128(0), MemoryStore::new()).is_err());
    }
}
