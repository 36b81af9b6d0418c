//! Genetic training of flapnet controllers.
//!
//! A population of [`Controller`](flapnet_network::Controller)s is flown
//! through a shared pipe stream; the number of pipes each bird passes before
//! dying is its fitness. After every generation the population is replaced by
//! its elites plus mutated crossovers of randomly drawn parents, and the best
//! controller ever seen is persisted.
//!
//! # Architecture
//!
//! ```text
//! Trainer ──────────── owns ───────────┐
//!   │                                  │
//!   ├─ GenerationRun (lock-step ticks) │
//!   │     ↓ Evaluation                 │
//!   ├─ PopulationManager ── evolve ────┤
//!   │     ↓ new best                   │
//!   └─ BestStore (JSON file / memory) ─┘
//! ```
//!
//! - [`config`] - [`TrainingConfig`](config::TrainingConfig) and its validation
//! - [`population`] - ranking, elitism, breeding and the best-ever record
//! - [`run`] - lock-step generation driver and parallel evaluation
//! - [`best`] - persisted best record
//! - [`summary`] - per-generation statistics
//! - [`trainer`] - the loop tying them together
//!
//! # Example
//!
//! ```
//! use flapnet_engine::Seed;
//! use flapnet_training::{best::MemoryStore, config::TrainingConfig, trainer::Trainer};
//!
//! let mut config = TrainingConfig::default();
//! config.ga.pop_size = 10;
//! config.max_ticks_per_generation = Some(2000);
//!
//! let mut trainer = Trainer::new(config, Seed::from_u128(42), MemoryStore::new()).unwrap();
//! for _ in 0..3 {
//!     let summary = trainer.run_generation_parallel();
//!     assert!(summary.fitness.max <= summary.best_score);
//! }
//! assert_eq!(trainer.generation(), 3);
//! ```

pub mod best;
pub mod config;
pub mod population;
pub mod run;
pub mod summary;
pub mod trainer;
