//! Training configuration.
//!
//! A [`TrainingConfig`] bundles every tunable constant of a run. It is
//! validated once, when a [`Trainer`](crate::trainer::Trainer) or
//! [`PopulationManager`](crate::population::PopulationManager) is built, and
//! treated as immutable afterwards.
//!
//! Every field has a default, so a JSON file only needs to name the values it
//! overrides:
//!
//! ```
//! use flapnet_training::config::TrainingConfig;
//!
//! let config: TrainingConfig =
//!     serde_json::from_str(r#"{"ga": {"pop_size": 50}, "scoring": "shared-first-crossing"}"#)
//!         .unwrap();
//! assert_eq!(config.ga.pop_size, 50);
//! assert_eq!(config.ga.hidden_size, 8);
//! assert!(config.scoring.is_shared_first_crossing());
//! assert!(config.validate().is_ok());
//! ```

use flapnet_engine::{FieldConfig, FieldConfigError, ScoringMode};
use serde::{Deserialize, Serialize};

/// Genetic algorithm parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaConfig {
    /// Number of controllers per generation.
    pub pop_size: usize,
    /// Hidden layer width of every controller.
    pub hidden_size: usize,
    /// Fraction of the population copied unchanged into the next generation.
    ///
    /// Kept in double precision so decimal fractions such as `0.7` floor to
    /// the expected elite count.
    pub elite_frac: f64,
    /// Per-parameter mutation probability.
    pub mutate_rate: f32,
    /// Half width of the uniform mutation perturbation.
    pub mutate_scale: f32,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            pop_size: 36,
            hidden_size: 8,
            elite_frac: 0.2,
            mutate_rate: 0.12,
            mutate_scale: 0.6,
        }
    }
}

impl GaConfig {
    /// Number of elites: `max(1, floor(pop_size * elite_frac))`, never more
    /// than the population.
    ///
    /// ```
    /// use flapnet_training::config::GaConfig;
    ///
    /// let config = GaConfig { pop_size: 4, elite_frac: 0.5, ..GaConfig::default() };
    /// assert_eq!(config.elite_count(), 2);
    /// let config = GaConfig { pop_size: 4, elite_frac: 0.1, ..GaConfig::default() };
    /// assert_eq!(config.elite_count(), 1);
    /// ```
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub fn elite_count(&self) -> usize {
        let elites = (self.pop_size as f64 * self.elite_frac).floor() as usize;
        elites.clamp(1, self.pop_size.max(1))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pop_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.hidden_size == 0 {
            return Err(ConfigError::EmptyHiddenLayer);
        }
        for (name, value) in [
            ("elite_frac", self.elite_frac),
            ("mutate_rate", f64::from(self.mutate_rate)),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::FractionOutOfRange { name, value });
            }
        }
        if !(self.mutate_scale.is_finite() && self.mutate_scale >= 0.0) {
            return Err(ConfigError::InvalidMutationScale(self.mutate_scale));
        }
        Ok(())
    }
}

/// Everything a training run needs to know.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub field: FieldConfig,
    pub ga: GaConfig,
    /// How passed pipes are credited to birds sharing a stream.
    pub scoring: ScoringMode,
    /// Retires every bird still alive after this many ticks.
    pub max_ticks_per_generation: Option<u64>,
    /// Puts the persisted best controller into the first population.
    pub seed_from_best: bool,
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.field.validate()?;
        self.ga.validate()?;
        if self.max_ticks_per_generation == Some(0) {
            return Err(ConfigError::ZeroTickCap);
        }
        Ok(())
    }
}

/// Reasons a configuration is rejected.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum ConfigError {
    #[display("invalid field: {_0}")]
    Field(FieldConfigError),
    #[display("population size must be at least 1")]
    EmptyPopulation,
    #[display("hidden layer size must be at least 1")]
    EmptyHiddenLayer,
    #[display("{name} must be within [0, 1] (got {value})")]
    FractionOutOfRange { name: &'static str, value: f64 },
    #[display("mutation scale must be finite and non-negative (got {_0})")]
    InvalidMutationScale(#[error(not(source))] f32),
    #[display("tick cap must be at least 1")]
    ZeroTickCap,
}
