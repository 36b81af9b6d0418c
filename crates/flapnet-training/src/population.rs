//! Genetic algorithm over [`Controller`]s.
//!
//! One generation cycle:
//!
//! 1. **Rank** - individuals are stably sorted by fitness, best first
//! 2. **Promote** - if the winner beats the best score so far, it becomes the
//!    new [`BestRecord`]
//! 3. **Elitism** - the top `elite_count` controllers are copied unchanged
//! 4. **Breeding** - every other slot is filled by the crossover of two
//!    parents drawn uniformly (with replacement) from the whole ranked list,
//!    then mutated
//!
//! Step 2 only updates in-memory state. Writing the record somewhere is left
//! to the caller (see [`Trainer`](crate::trainer::Trainer)), so [`Evolver`]
//! and [`PopulationManager`] never touch the filesystem.

use std::cmp::Reverse;

use chrono::Utc;
use flapnet_engine::Seed;
use flapnet_network::Controller;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::{
    best::BestRecord,
    config::{ConfigError, GaConfig},
};

/// A controller together with the fitness it reached in one generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    controller: Controller,
    fitness: u32,
}

impl Individual {
    #[must_use]
    pub fn new(controller: Controller, fitness: u32) -> Self {
        Self {
            controller,
            fitness,
        }
    }

    #[must_use]
    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Pipes passed before dying.
    #[must_use]
    pub fn fitness(&self) -> u32 {
        self.fitness
    }
}

/// Breeding parameters of one evolve step.
#[derive(Debug, Clone, PartialEq)]
pub struct Evolver {
    pub elite_count: usize,
    pub mutate_rate: f32,
    pub mutate_scale: f32,
}

impl Evolver {
    #[must_use]
    pub fn from_config(config: &GaConfig) -> Self {
        Self {
            elite_count: config.elite_count(),
            mutate_rate: config.mutate_rate,
            mutate_scale: config.mutate_scale,
        }
    }

    /// Sorts individuals by fitness, best first.
    ///
    /// The sort is stable: ties keep their population order.
    pub fn rank(individuals: &mut [Individual]) {
        individuals.sort_by_key(|ind| Reverse(ind.fitness));
    }

    /// Breeds the next population from a ranked one.
    ///
    /// The result has the same length as `ranked` and starts with clones of
    /// the first `elite_count` controllers.
    ///
    /// # Panics
    ///
    /// Panics if `ranked` is empty or not sorted by descending fitness.
    #[must_use]
    pub fn evolve<R>(&self, ranked: &[Individual], rng: &mut R) -> Vec<Controller>
    where
        R: Rng + ?Sized,
    {
        assert!(!ranked.is_empty(), "cannot evolve an empty population");
        assert!(ranked.is_sorted_by(|a, b| a.fitness >= b.fitness));

        let elite_count = self.elite_count.min(ranked.len());
        let mut next: Vec<Controller> = ranked[..elite_count]
            .iter()
            .map(|ind| ind.controller.clone())
            .collect();

        while next.len() < ranked.len() {
            let a = &ranked[rng.random_range(0..ranked.len())];
            let b = &ranked[rng.random_range(0..ranked.len())];
            let mut child = Controller::crossover(&a.controller, &b.controller);
            child.mutate(self.mutate_rate, self.mutate_scale, rng);
            next.push(child);
        }
        next
    }
}

/// What one call to [`PopulationManager::evaluate_and_evolve`] did.
#[derive(Debug, Clone, PartialEq)]
pub struct EvolveOutcome {
    /// Generation that was evaluated.
    pub generation: u64,
    /// Fitness of the winner of that generation.
    pub top_fitness: u32,
    /// The winner became the new best-ever record.
    pub new_best: bool,
}

/// Owns the population, the best-ever record and the generation counter.
///
/// # Example
///
/// ```
/// use flapnet_engine::Seed;
/// use flapnet_training::{config::GaConfig, population::{Individual, PopulationManager}};
///
/// let config = GaConfig { pop_size: 4, ..GaConfig::default() };
/// let mut manager = PopulationManager::new(config, Seed::from_u128(1)).unwrap();
/// let evaluated = manager
///     .population()
///     .iter()
///     .zip([3, 0, 5, 1])
///     .map(|(c, fitness)| Individual::new(c.clone(), fitness))
///     .collect();
/// let outcome = manager.evaluate_and_evolve(evaluated);
/// assert!(outcome.new_best);
/// assert_eq!(manager.best_score(), 5);
/// assert_eq!(manager.generation(), 1);
/// assert_eq!(manager.population().len(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct PopulationManager {
    config: GaConfig,
    evolver: Evolver,
    population: Vec<Controller>,
    best: Option<BestRecord>,
    generation: u64,
    rng: Pcg32,
}

impl PopulationManager {
    /// Creates a random initial population.
    pub fn new(config: GaConfig, seed: Seed) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = seed.rng();
        let population = (0..config.pop_size)
            .map(|_| Controller::random(config.hidden_size, &mut rng))
            .collect();
        Ok(Self {
            evolver: Evolver::from_config(&config),
            config,
            population,
            best: None,
            generation: 0,
            rng,
        })
    }

    #[must_use]
    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    #[must_use]
    pub fn population(&self) -> &[Controller] {
        &self.population
    }

    /// Number of completed generations.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn best(&self) -> Option<&BestRecord> {
        self.best.as_ref()
    }

    /// Best score so far, or zero before any controller has scored.
    #[must_use]
    pub fn best_score(&self) -> u32 {
        self.best.as_ref().map_or(0, |best| best.score)
    }

    /// Adopts a previously persisted record.
    ///
    /// Ignored if it does not beat the current best, so the best score never
    /// goes down.
    pub fn restore_best(&mut self, record: BestRecord) {
        if self.best.as_ref().is_none_or(|best| record.score > best.score) {
            self.best = Some(record);
        }
    }

    /// Replaces the first controller of the population with a copy of the
    /// best one.
    ///
    /// Returns `false` (and changes nothing) if there is no best record or its
    /// hidden width differs from the configured one.
    pub fn seed_population_from_best(&mut self) -> bool {
        match &self.best {
            Some(best) if best.controller.hidden_size() == self.config.hidden_size => {
                self.population[0] = best.controller.clone();
                true
            }
            _ => false,
        }
    }

    /// Draws the seed of the next generation's pipe stream.
    pub fn next_stream_seed(&mut self) -> Seed {
        self.rng.random()
    }

    /// Ranks an evaluated generation, promotes its winner and replaces the
    /// population with the next one.
    ///
    /// # Panics
    ///
    /// Panics if `individuals` does not hold exactly `pop_size` entries.
    pub fn evaluate_and_evolve(&mut self, mut individuals: Vec<Individual>) -> EvolveOutcome {
        assert_eq!(
            individuals.len(),
            self.config.pop_size,
            "one individual per controller expected"
        );
        Evolver::rank(&mut individuals);

        let winner = &individuals[0];
        let new_best = winner.fitness > self.best_score();
        if new_best {
            self.best = Some(BestRecord {
                controller: winner.controller.clone(),
                score: winner.fitness,
                generation: self.generation,
                trained_at: Some(Utc::now()),
            });
        }
        let outcome = EvolveOutcome {
            generation: self.generation,
            top_fitness: winner.fitness,
            new_best,
        };

        self.population = self.evolver.evolve(&individuals, &mut self.rng);
        self.generation += 1;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;

    use super::*;

    fn controllers(count: usize, hidden: usize, seed: u64) -> Vec<Controller> {
        let mut rng = Pcg32::seed_from_u64(seed);
        (0..count)
            .map(|_| Controller::random(hidden, &mut rng))
            .collect()
    }

    fn evaluate(population: &[Controller], fitness: &[u32]) -> Vec<Individual> {
        population
            .iter()
            .zip(fitness)
            .map(|(c, &f)| Individual::new(c.clone(), f))
            .collect()
    }

    #[test]
    fn test_rank_is_stable_and_descending() {
        let pop = controllers(4, 2, 0);
        let mut individuals = evaluate(&pop, &[3, 7, 3, 9]);
        Evolver::rank(&mut individuals);
        let order: Vec<_> = individuals
            .iter()
            .map(|ind| pop.iter().position(|c| c == ind.controller()).unwrap())
            .collect();
        assert_eq!(order, [3, 1, 0, 2]);
    }

    #[test]
    fn test_elites_survive_unchanged() {
        // fitness [10, 7, 3, 1], elite_frac 0.5
        let config = GaConfig {
            pop_size: 4,
            elite_frac: 0.5,
            mutate_rate: 1.0,
            ..GaConfig::default()
        };
        let pop = controllers(4, 8, 1);
        let mut ranked = evaluate(&pop, &[1, 10, 3, 7]);
        Evolver::rank(&mut ranked);
        let next = Evolver::from_config(&config).evolve(&ranked, &mut Pcg32::seed_from_u64(2));
        assert_eq!(next.len(), 4);
        assert_eq!(next[0], pop[1]);
        assert_eq!(next[1], pop[3]);
        // offspring are always mutated at rate 1
        for child in &next[2..] {
            assert!(!pop.contains(child));
        }
    }

    #[test]
    fn test_population_size_is_preserved() {
        for pop_size in [1, 2, 3, 5, 36] {
            let config = GaConfig {
                pop_size,
                hidden_size: 2,
                ..GaConfig::default()
            };
            let mut manager = PopulationManager::new(config, Seed::from_u128(9)).unwrap();
            for generation in 0..3 {
                let fitness: Vec<u32> = (0u32..).take(pop_size).map(|i| (i * 7) % 5).collect();
                let evaluated = evaluate(manager.population(), &fitness);
                manager.evaluate_and_evolve(evaluated);
                assert_eq!(manager.population().len(), pop_size);
                assert_eq!(manager.generation(), generation + 1);
            }
        }
    }

    #[test]
    fn test_best_score_never_decreases() {
        let config = GaConfig {
            pop_size: 3,
            hidden_size: 2,
            ..GaConfig::default()
        };
        let mut manager = PopulationManager::new(config, Seed::from_u128(3)).unwrap();
        let mut best_scores = vec![];
        for fitness in [[2, 1, 0], [5, 0, 0], [1, 1, 1], [5, 4, 3], [6, 0, 0]] {
            let evaluated = evaluate(manager.population(), &fitness);
            manager.evaluate_and_evolve(evaluated);
            best_scores.push(manager.best_score());
        }
        assert_eq!(best_scores, [2, 5, 5, 5, 6]);
        assert_eq!(manager.best().unwrap().generation, 4);
    }

    #[test]
    fn test_tied_score_does_not_replace_best() {
        let config = GaConfig {
            pop_size: 2,
            hidden_size: 2,
            ..GaConfig::default()
        };
        let mut manager = PopulationManager::new(config, Seed::from_u128(4)).unwrap();
        let first = manager.evaluate_and_evolve(evaluate(manager.population(), &[4, 0]));
        assert!(first.new_best);
        let best = manager.best().unwrap().controller.clone();
        let second = manager.evaluate_and_evolve(evaluate(manager.population(), &[0, 4]));
        assert!(!second.new_best);
        assert_eq!(second.top_fitness, 4);
        assert_eq!(manager.best().unwrap().controller, best);
    }

    #[test]
    fn test_all_zero_fitness_keeps_no_best() {
        let config = GaConfig {
            pop_size: 3,
            hidden_size: 2,
            ..GaConfig::default()
        };
        let mut manager = PopulationManager::new(config, Seed::from_u128(5)).unwrap();
        let outcome = manager.evaluate_and_evolve(evaluate(manager.population(), &[0, 0, 0]));
        assert!(!outcome.new_best);
        assert!(manager.best().is_none());
    }

    #[test]
    fn test_restore_best_keeps_higher_score() {
        let config = GaConfig {
            pop_size: 2,
            hidden_size: 3,
            ..GaConfig::default()
        };
        let mut manager = PopulationManager::new(config, Seed::from_u128(6)).unwrap();
        let record = |score| BestRecord {
            controller: controllers(1, 3, u64::from(score)).remove(0),
            score,
            generation: 0,
            trained_at: None,
        };
        manager.restore_best(record(8));
        manager.restore_best(record(2));
        assert_eq!(manager.best_score(), 8);
    }

    #[test]
    fn test_seed_population_from_best_requires_matching_width() {
        let config = GaConfig {
            pop_size: 2,
            hidden_size: 3,
            ..GaConfig::default()
        };
        let mut manager = PopulationManager::new(config, Seed::from_u128(7)).unwrap();
        assert!(!manager.seed_population_from_best());

        let narrow = controllers(1, 2, 0).remove(0);
        manager.restore_best(BestRecord {
            controller: narrow,
            score: 1,
            generation: 0,
            trained_at: None,
        });
        assert!(!manager.seed_population_from_best());

        let matching = controllers(1, 3, 0).remove(0);
        manager.restore_best(BestRecord {
            controller: matching.clone(),
            score: 2,
            generation: 0,
            trained_at: None,
        });
        assert!(manager.seed_population_from_best());
        assert_eq!(manager.population()[0], matching);
    }

    #[test]
    fn test_same_seed_same_population() {
        let config = GaConfig::default();
        let a = PopulationManager::new(config.clone(), Seed::from_u128(11)).unwrap();
        let b = PopulationManager::new(config, Seed::from_u128(11)).unwrap();
        assert_eq!(a.population(), b.population());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = GaConfig {
            hidden_size: 0,
            ..GaConfig::default()
        };
        assert!(matches!(
            PopulationManager::new(config, Seed::from_u128(0)),
            Err(ConfigError::EmptyHiddenLayer)
        ));
    }
}
