//! Optimizer hyperparameters.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use awj_types::{config_error, AwjResult};

use crate::fitness::FitnessWeights;

/// Tunable configuration for one optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Candidates per generation.
    pub population_size: usize,

    /// Upper bound on generations after generation 0.
    pub max_generations: usize,

    pub tournament_size: usize,

    /// Probability that a parent pair is blended rather than copied.
    pub crossover_probability: f64,

    /// Per-dimension probability of a Gaussian perturbation.
    pub mutation_probability: f64,

    /// Mutation standard deviation as a fraction of each dimension's range.
    pub mutation_scale: f64,

    /// Best candidates carried over unchanged each generation.
    pub elite_count: usize,

    /// Generations without meaningful improvement before giving up.
    pub stagnation_window: usize,

    /// Minimum fitness decrease that counts as improvement.
    pub stagnation_epsilon: f64,

    /// Stop once best fitness drops below this value. `None` disables.
    pub fitness_threshold: Option<f64>,

    /// Wall-clock budget, checked between generations. `None` disables.
    pub timeout_ms: Option<u64>,

    /// Evaluate each generation on the rayon pool.
    pub parallel_evaluation: bool,

    pub weights: FitnessWeights,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            max_generations: 100,
            tournament_size: 3,
            crossover_probability: 0.9,
            mutation_probability: 0.2,
            mutation_scale: 0.1,
            elite_count: 1,
            stagnation_window: 25,
            stagnation_epsilon: 1e-6,
            fitness_threshold: Some(1e-3),
            timeout_ms: None,
            parallel_evaluation: true,
            weights: FitnessWeights::default(),
        }
    }
}

impl OptimizerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    pub fn with_stagnation(mut self, window: usize, epsilon: f64) -> Self {
        self.stagnation_window = window;
        self.stagnation_epsilon = epsilon;
        self
    }

    pub fn with_fitness_threshold(mut self, threshold: Option<f64>) -> Self {
        self.fitness_threshold = threshold;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn with_parallel_evaluation(mut self, enabled: bool) -> Self {
        self.parallel_evaluation = enabled;
        self
    }

    pub fn with_weights(mut self, weights: FitnessWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> AwjResult<()> {
        if self.population_size == 0 {
            return Err(config_error!("population_size must be at least 1"));
        }
        if self.elite_count == 0 {
            return Err(config_error!("elite_count must be at least 1"));
        }
        if self.population_size <= self.elite_count {
            return Err(config_error!(
                "population_size {} must exceed elite_count {}",
                self.population_size,
                self.elite_count
            ));
        }
        if self.tournament_size == 0 {
            return Err(config_error!("tournament_size must be at least 1"));
        }
        for (name, p) in [
            ("crossover_probability", self.crossover_probability),
            ("mutation_probability", self.mutation_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(config_error!("{name} must be within [0, 1], got {p}"));
            }
        }
        if !self.mutation_scale.is_finite() || self.mutation_scale <= 0.0 {
            return Err(config_error!(
                "mutation_scale must be positive, got {}",
                self.mutation_scale
            ));
        }
        if self.stagnation_window == 0 {
            return Err(config_error!("stagnation_window must be at least 1"));
        }
        if !self.stagnation_epsilon.is_finite() || self.stagnation_epsilon < 0.0 {
            return Err(config_error!(
                "stagnation_epsilon must be non-negative, got {}",
                self.stagnation_epsilon
            ));
        }
        if let Some(t) = self.fitness_threshold {
            if !t.is_finite() {
                return Err(config_error!("fitness_threshold must be finite, got {t}"));
            }
        }
        self.weights.validate()
    }

    pub fn from_json_str(json: &str) -> AwjResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> AwjResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use awj_types::AwjError;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        assert!(OptimizerConfig::default().validate().is_ok());
    }

    #[test]
    fn builder_chain() {
        let config = OptimizerConfig::new()
            .with_population_size(30)
            .with_max_generations(50)
            .with_stagnation(10, 1e-9)
            .with_fitness_threshold(None)
            .with_timeout(Duration::from_millis(250))
            .with_parallel_evaluation(false);
        assert_eq!(config.population_size, 30);
        assert_eq!(config.max_generations, 50);
        assert_eq!(config.stagnation_window, 10);
        assert_eq!(config.fitness_threshold, None);
        assert_eq!(config.timeout(), Some(Duration::from_millis(250)));
        assert!(!config.parallel_evaluation);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn huge_timeout_saturates() {
        let config = OptimizerConfig::new().with_timeout(Duration::MAX);
        assert_eq!(config.timeout_ms, Some(u64::MAX));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        let cases = [
            OptimizerConfig::new().with_population_size(0),
            OptimizerConfig::new().with_population_size(1),
            OptimizerConfig {
                tournament_size: 0,
                ..OptimizerConfig::default()
            },
            OptimizerConfig {
                mutation_probability: 1.5,
                ..OptimizerConfig::default()
            },
            OptimizerConfig {
                mutation_scale: 0.0,
                ..OptimizerConfig::default()
            },
            OptimizerConfig::new().with_stagnation(0, 1e-6),
        ];
        for config in cases {
            assert!(
                matches!(config.validate(), Err(AwjError::Config(_))),
                "accepted {config:?}"
            );
        }
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = OptimizerConfig::from_json_str(
            r#"{ "population_size": 30, "weights": { "secondary": 0.01 } }"#,
        )
        .unwrap();
        assert_eq!(config.population_size, 30);
        assert_eq!(config.max_generations, 100);
        assert_eq!(config.weights.secondary, 0.01);
        assert_eq!(config.weights.depth_error, 1.0);
    }

    #[test]
    fn invalid_json_config_rejected() {
        let err = OptimizerConfig::from_json_str(r#"{ "crossover_probability": 2.0 }"#);
        assert!(matches!(err, Err(AwjError::Config(_))));
        let err = OptimizerConfig::from_json_str("not json");
        assert!(matches!(err, Err(AwjError::Serialization(_))));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "max_generations": 42, "timeout_ms": 1000 }}"#).unwrap();
        let config = OptimizerConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.max_generations, 42);
        assert_eq!(config.timeout(), Some(Duration::from_secs(1)));
    }
}
