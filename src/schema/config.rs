//! Configuration types for the evolutionary engine.

use serde::{Deserialize, Serialize};

/// Top-level configuration for one evolution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Path namespace for durable storage of individuals.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Desired population size.
    #[serde(default = "default_n_pop")]
    pub n_pop: usize,
    /// Termination threshold on the population's mean-squared fitness error.
    #[serde(default)]
    pub term_limit: f64,
    /// Decimal places used when binning fitness values for the histogram.
    #[serde(default = "default_hist_granularity")]
    pub hist_granularity: u32,
    /// Fraction of the population retained as fit parents each generation.
    #[serde(default = "default_selection_rate")]
    pub selection_rate: f64,
    /// Probability that an unfit individual is mutated rather than evicted.
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
    /// Generation budget before the run is abandoned.
    #[serde(default = "default_max_generations")]
    pub max_generations: u32,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Feature-set parameters shared by every individual in the run.
    #[serde(default)]
    pub features: FeatureConfig,
    /// Approximate membership filter sizing.
    #[serde(default)]
    pub filter: FilterConfig,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            n_pop: default_n_pop(),
            term_limit: 0.0,
            hist_granularity: default_hist_granularity(),
            selection_rate: default_selection_rate(),
            mutation_rate: default_mutation_rate(),
            max_generations: default_max_generations(),
            random_seed: None,
            features: FeatureConfig::default(),
            filter: FilterConfig::default(),
        }
    }
}

fn default_prefix() -> String {
    "/tmp/genepool".to_string()
}
fn default_n_pop() -> usize {
    11
}
fn default_hist_granularity() -> u32 {
    3
}
fn default_selection_rate() -> f64 {
    0.5
}
fn default_mutation_rate() -> f64 {
    0.3
}
fn default_max_generations() -> u32 {
    200
}

/// Feature-set parameters: every individual carries `length` integers in
/// `[min, max]`, scored against `target`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Feature-set sum that yields a perfect fitness of 1.0.
    pub target: f64,
    /// Number of features per individual.
    pub length: usize,
    /// Lower bound for a feature value (inclusive).
    pub min: i64,
    /// Upper bound for a feature value (inclusive).
    pub max: i64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            target: 231.0,
            length: 5,
            min: 0,
            max: 100,
        }
    }
}

/// Sizing for the approximate membership filter that fronts the exact store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Backing bit-array size in bytes.
    #[serde(default = "default_filter_bytes")]
    pub num_bytes: usize,
    /// Bit probes per key.
    #[serde(default = "default_filter_probes")]
    pub num_probes: u32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            num_bytes: default_filter_bytes(),
            num_probes: default_filter_probes(),
        }
    }
}

fn default_filter_bytes() -> usize {
    125
}
fn default_filter_probes() -> u32 {
    14
}

impl EvolutionConfig {
    /// Validate configuration parameters.
    ///
    /// Malformed configuration fails here, before a run starts, rather than
    /// mid-generation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_pop == 0 {
            return Err(ConfigError::InvalidPopulationSize);
        }
        if self.term_limit < 0.0 {
            return Err(ConfigError::InvalidTermLimit(self.term_limit));
        }
        if !(self.selection_rate > 0.0 && self.selection_rate <= 1.0) {
            return Err(ConfigError::InvalidSelectionRate(self.selection_rate));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigError::InvalidMutationRate(self.mutation_rate));
        }
        if self.features.target <= 0.0 {
            return Err(ConfigError::InvalidTarget(self.features.target));
        }
        if self.features.length == 0 {
            return Err(ConfigError::InvalidLength);
        }
        if self.features.min > self.features.max {
            return Err(ConfigError::InvalidBounds {
                min: self.features.min,
                max: self.features.max,
            });
        }
        if self.filter.num_bytes == 0 || self.filter.num_probes == 0 {
            return Err(ConfigError::InvalidFilter);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("population size must be non-zero")]
    InvalidPopulationSize,
    #[error("termination limit must be non-negative, got {0}")]
    InvalidTermLimit(f64),
    #[error("selection rate must be in (0, 1], got {0}")]
    InvalidSelectionRate(f64),
    #[error("mutation rate must be in [0, 1], got {0}")]
    InvalidMutationRate(f64),
    #[error("fitness target must be positive, got {0}")]
    InvalidTarget(f64),
    #[error("feature length must be non-zero")]
    InvalidLength,
    #[error("feature bounds invalid: min {min} > max {max}")]
    InvalidBounds { min: i64, max: i64 },
    #[error("dedup filter needs non-zero byte and probe counts")]
    InvalidFilter,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = EvolutionConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_bounds() {
        let config = EvolutionConfig {
            features: FeatureConfig {
                min: 10,
                max: 0,
                ..FeatureConfig::default()
            },
            ..EvolutionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBounds { min: 10, max: 0 })
        ));
    }

    #[test]
    fn test_rejects_bad_rates() {
        let config = EvolutionConfig {
            selection_rate: 0.0,
            ..EvolutionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSelectionRate(_))
        ));

        let config = EvolutionConfig {
            mutation_rate: 1.5,
            ..EvolutionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMutationRate(_))
        ));
    }

    #[test]
    fn test_rejects_non_positive_target() {
        let config = EvolutionConfig {
            features: FeatureConfig {
                target: 0.0,
                ..FeatureConfig::default()
            },
            ..EvolutionConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTarget(_))));
    }

    #[test]
    fn test_serialization_roundtrip() {
        let config = EvolutionConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: EvolutionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.n_pop, config.n_pop);
        assert_eq!(parsed.features.length, config.features.length);
        assert_eq!(parsed.filter.num_bytes, config.filter.num_bytes);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: EvolutionConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.n_pop, 11);
        assert_eq!(parsed.hist_granularity, 3);
        assert_eq!(parsed.features.target, 231.0);
        assert_eq!(parsed.filter.num_probes, 14);
    }
}
