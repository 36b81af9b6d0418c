//! Simulation of one generation.
//!
//! [`GenerationRun`] steps every bird of the population in lock-step against
//! one shared [`PipeStream`]. Each tick:
//!
//! 1. the stream advances once (spawn, scroll, prune)
//! 2. every live bird senses, asks its controller, moves and is tested for
//!    collision; a colliding bird dies and its fitness and age freeze
//! 3. live birds are credited for the pipes they passed
//!
//! The run finishes exactly when no bird is alive. With a tick cap, birds
//! still alive when the cap is reached are retired: they stop like dead birds
//! but keep the fitness they earned.
//!
//! [`evaluate_parallel`] computes the same fitness values without the shared
//! state, replaying the seeded stream once per bird on its own thread.

use std::thread;

use flapnet_engine::{
    Bird, FieldConfig, Pipe, PipeStream, ScoringMode, Seed, SoloGame, collides,
    score_passed_pipes, sense,
};
use flapnet_network::Controller;

use crate::population::Individual;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum RunState {
    Running,
    Finished,
}

/// Fitness of every controller of a finished generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// One entry per controller, in population order.
    pub individuals: Vec<Individual>,
    /// Ticks until the last bird stopped.
    pub ticks: u64,
    /// Birds stopped by the tick cap rather than a collision.
    pub retired: usize,
}

/// A population of birds flying through one shared pipe stream.
///
/// # Example
///
/// ```
/// use flapnet_engine::{FieldConfig, ScoringMode, Seed};
/// use flapnet_network::Controller;
/// use flapnet_training::run::GenerationRun;
/// use rand::SeedableRng as _;
///
/// let mut rng = rand_pcg::Pcg32::seed_from_u64(0);
/// let controllers = (0..4).map(|_| Controller::random(4, &mut rng)).collect();
/// let mut run = GenerationRun::new(
///     FieldConfig::default(),
///     ScoringMode::PerAgent,
///     Some(1000),
///     controllers,
///     Seed::from_u128(0),
/// );
/// while run.tick().is_running() {}
/// assert_eq!(run.alive_count(), 0);
/// assert_eq!(run.evaluation().individuals.len(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct GenerationRun {
    field: FieldConfig,
    scoring: ScoringMode,
    max_ticks: Option<u64>,
    controllers: Vec<Controller>,
    birds: Vec<Bird>,
    stream: PipeStream,
    retired: usize,
}

impl GenerationRun {
    /// Starts a generation with one fresh bird per controller.
    ///
    /// # Panics
    ///
    /// `field` must pass [`FieldConfig::validate`]. Debug builds check this
    /// here; otherwise a zero spawn interval panics on the first tick.
    #[must_use]
    pub fn new(
        field: FieldConfig,
        scoring: ScoringMode,
        max_ticks: Option<u64>,
        controllers: Vec<Controller>,
        seed: Seed,
    ) -> Self {
        debug_assert!(field.validate().is_ok(), "invalid field configuration");
        let birds = vec![Bird::new(&field); controllers.len()];
        Self {
            field,
            scoring,
            max_ticks,
            controllers,
            birds,
            stream: PipeStream::with_seed(seed),
            retired: 0,
        }
    }

    #[must_use]
    pub fn field(&self) -> &FieldConfig {
        &self.field
    }

    #[must_use]
    pub fn birds(&self) -> &[Bird] {
        &self.birds
    }

    #[must_use]
    pub fn controllers(&self) -> &[Controller] {
        &self.controllers
    }

    #[must_use]
    pub fn pipes(&self) -> &[Pipe] {
        self.stream.pipes()
    }

    #[must_use]
    pub fn seed(&self) -> Seed {
        self.stream.seed()
    }

    /// Ticks elapsed since the run started.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.stream.tick()
    }

    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.birds.iter().filter(|bird| bird.is_alive()).count()
    }

    /// Highest fitness reached by any bird so far.
    #[must_use]
    pub fn max_fitness(&self) -> u32 {
        self.birds.iter().map(Bird::fitness).max().unwrap_or(0)
    }

    #[must_use]
    pub fn retired(&self) -> usize {
        self.retired
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        if self.birds.iter().any(Bird::is_alive) {
            RunState::Running
        } else {
            RunState::Finished
        }
    }

    /// Advances the run by one tick.
    ///
    /// Does nothing once the run has finished.
    pub fn tick(&mut self) -> RunState {
        if self.state().is_finished() {
            return RunState::Finished;
        }

        self.stream.advance(&self.field);
        for (bird, controller) in self.birds.iter_mut().zip(&self.controllers) {
            if !bird.is_alive() {
                continue;
            }
            let sensors = sense(bird, self.stream.pipes(), &self.field);
            bird.step(controller.decide(&sensors), &self.field);
            if collides(bird, self.stream.pipes(), &self.field) {
                bird.kill();
            }
        }
        score_passed_pipes(&mut self.birds, &mut self.stream, &self.field, self.scoring);

        if let Some(cap) = self.max_ticks
            && self.stream.tick() >= cap
        {
            for bird in self.birds.iter_mut().filter(|bird| bird.is_alive()) {
                bird.kill();
                self.retired += 1;
            }
        }
        self.state()
    }

    /// Pairs each controller with its bird's current fitness.
    #[must_use]
    pub fn evaluation(&self) -> Evaluation {
        let individuals = self
            .controllers
            .iter()
            .zip(&self.birds)
            .map(|(controller, bird)| Individual::new(controller.clone(), bird.fitness()))
            .collect();
        Evaluation {
            individuals,
            ticks: self.stream.tick(),
            retired: self.retired,
        }
    }
}

/// Plays every controller against its own replay of the stream seeded with
/// `seed`, one thread per controller.
///
/// With [`ScoringMode::PerAgent`] the result equals that of running a
/// [`GenerationRun`] with the same seed to completion.
#[must_use]
pub fn evaluate_parallel(
    field: &FieldConfig,
    max_ticks: Option<u64>,
    controllers: &[Controller],
    seed: Seed,
) -> Evaluation {
    let games: Vec<SoloGame> = thread::scope(|s| {
        let handles: Vec<_> = controllers
            .iter()
            .map(|controller| {
                s.spawn(move || {
                    let mut game = SoloGame::new(field.clone(), seed);
                    while game.state().is_playing()
                        && max_ticks.is_none_or(|cap| game.stream().tick() < cap)
                    {
                        game.tick_with(controller);
                    }
                    game
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(game) => game,
                Err(payload) => std::panic::resume_unwind(payload),
            })
            .collect()
    });

    let individuals = controllers
        .iter()
        .zip(&games)
        .map(|(controller, game)| Individual::new(controller.clone(), game.score()))
        .collect();
    Evaluation {
        individuals,
        ticks: games
            .iter()
            .map(|game| game.stream().tick())
            .max()
            .unwrap_or(0),
        retired: games
            .iter()
            .filter(|game| game.state().is_playing())
            .count(),
    }
}
