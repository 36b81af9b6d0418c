use std::time::Duration;

use serde::Serialize;

/// Fitness distribution of one generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitnessStats {
    pub min: u32,
    pub max: u32,
    pub mean: f32,
    pub median: u32,
    /// Population standard deviation.
    pub std_dev: f32,
}

impl FitnessStats {
    /// Computes statistics over unsorted fitness values.
    ///
    /// Returns `None` for an empty input.
    ///
    /// ```
    /// use flapnet_training::summary::FitnessStats;
    ///
    /// let stats = FitnessStats::new([5, 2, 4, 1, 3]).unwrap();
    /// assert_eq!(stats.min, 1);
    /// assert_eq!(stats.max, 5);
    /// assert_eq!(stats.mean, 3.0);
    /// assert_eq!(stats.median, 3);
    /// ```
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = u32>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_unstable();

        let min = *values.first()?;
        let max = *values.last()?;
        let n = values.len() as f32;
        let mean = values.iter().map(|&v| v as f32).sum::<f32>() / n;
        let median = values[values.len() / 2];
        let variance = values
            .iter()
            .map(|&v| (v as f32 - mean).powi(2))
            .sum::<f32>()
            / n;

        Some(Self {
            min,
            max,
            mean,
            median,
            std_dev: variance.sqrt(),
        })
    }
}

/// Report emitted when a generation finishes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationSummary {
    /// Generation that just finished, counting from zero.
    pub generation: u64,
    /// Ticks the generation lasted.
    pub ticks: u64,
    /// Birds still alive when the tick cap retired them.
    pub retired: usize,
    pub fitness: FitnessStats,
    /// Best-ever score after this generation.
    pub best_score: u32,
    pub new_best: bool,
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
}

mod duration_secs {
    use std::time::Duration;

    use serde::Serializer;

    pub(super) fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(value.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_single_value() {
        let stats = FitnessStats::new([7]).unwrap();
        assert_eq!(
            stats,
            FitnessStats {
                min: 7,
                max: 7,
                mean: 7.0,
                median: 7,
                std_dev: 0.0,
            }
        );
    }

    #[test]
    fn test_stats_empty() {
        assert!(FitnessStats::new([]).is_none());
    }

    #[test]
    fn test_stats_even_count_uses_upper_median() {
        let stats = FitnessStats::new([0, 0, 2, 6]).unwrap();
        assert_eq!(stats.median, 2);
        assert_eq!(stats.mean, 2.0);
        assert!((stats.std_dev - 6.0_f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_summary_serializes_elapsed_as_seconds() {
        let summary = GenerationSummary {
            generation: 2,
            ticks: 120,
            retired: 0,
            fitness: FitnessStats::new([1, 2, 3]).unwrap(),
            best_score: 3,
            new_best: true,
            elapsed: Duration::from_millis(1500),
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["elapsed"], 1.5);
        assert_eq!(value["fitness"]["max"], 3);
    }
}
