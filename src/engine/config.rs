//! Engine and per-run configuration.
//!
//! [`EngineConfig`] fixes how an engine scores survival for its lifetime;
//! [`RunOptions`] carries the parameters of a single `run` call. Both use
//! builder-style setters and are validated before any generation executes.

use crate::error::Error;

/// Construction-time parameters of an [`crate::engine::Engine`].
///
/// # Survival weights
///
/// Survival probability blends two normalized fitness positions:
///
/// - `abs_weight` scales the position within the run's **all-time** fitness
///   range. Think of it as environmental pressure: a bad solution cannot
///   survive even when everything around it is worse.
/// - `rel_weight` scales the position within the **current generation's**
///   range. Think of it as competitive pressure: a relatively strong
///   solution gains an advantage even in a weak generation.
///
/// The weights must each lie in `[0, 1]` and sum to 1.
///
/// # Examples
///
/// ```
/// use evostrand::engine::EngineConfig;
///
/// let config = EngineConfig::default().with_weights(0.5, 0.5).with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// Fraction of survival probability apportioned to the run's all-time
    /// fitness range.
    pub abs_weight: f64,

    /// Fraction of survival probability apportioned to the current
    /// generation's fitness range.
    pub rel_weight: f64,

    /// Random seed for reproducibility. `None` uses a process-random seed.
    pub seed: Option<u64>,

    /// Whether to score uncached chromosomes in parallel using rayon.
    ///
    /// Scores land in the per-run cache either way, so selection order and
    /// statistics stay deterministic for a fixed seed.
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            abs_weight: 0.25,
            rel_weight: 0.75,
            seed: None,
            parallel: false,
        }
    }
}

impl EngineConfig {
    /// Sets both survival weights.
    pub fn with_weights(mut self, abs_weight: f64, rel_weight: f64) -> Self {
        self.abs_weight = abs_weight;
        self.rel_weight = rel_weight;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables parallel scoring.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), Error> {
        let in_range =
            (0.0..=1.0).contains(&self.abs_weight) && (0.0..=1.0).contains(&self.rel_weight);
        // Tolerate float representation noise in the sum.
        if !in_range || (self.abs_weight + self.rel_weight - 1.0).abs() > 1e-9 {
            return Err(Error::InvalidWeights {
                abs: self.abs_weight,
                rel: self.rel_weight,
            });
        }
        Ok(())
    }
}

/// Parameters of a single `run` call.
///
/// # Examples
///
/// ```
/// use evostrand::engine::RunOptions;
///
/// let opts = RunOptions::new(500, 0.15, 0.25)
///     .with_elitist(true)
///     .with_quit_after(100);
/// assert!(opts.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunOptions {
    /// How many generations to run.
    pub generations: usize,

    /// Probability of mutation per encoded position, in `[0, 1]`.
    pub p_mutate: f64,

    /// Probability that a crossover event occurs for each offspring,
    /// in `[0, 1]`.
    pub p_crossover: f64,

    /// Whether to overwrite the weakest solution's DNA with the all-time
    /// best whenever a generation fails to improve on it.
    pub elitist: bool,

    /// Generations without a new all-time best before one mass mutation
    /// pass refreshes the population. `None` disables refreshing.
    pub refresh_after: Option<usize>,

    /// Generations without a new all-time best before the run stops early.
    /// `None` disables the limit.
    pub quit_after: Option<usize>,
}

impl RunOptions {
    /// Creates options for `generations` iterations at the given mutation
    /// and crossover rates, with elitism on and no stagnation thresholds.
    pub fn new(generations: usize, p_mutate: f64, p_crossover: f64) -> Self {
        Self {
            generations,
            p_mutate,
            p_crossover,
            elitist: true,
            refresh_after: None,
            quit_after: None,
        }
    }

    /// Enables or disables elitism.
    pub fn with_elitist(mut self, elitist: bool) -> Self {
        self.elitist = elitist;
        self
    }

    /// Sets the refresh threshold.
    pub fn with_refresh_after(mut self, generations: usize) -> Self {
        self.refresh_after = Some(generations);
        self
    }

    /// Sets the early-quit threshold.
    pub fn with_quit_after(mut self, generations: usize) -> Self {
        self.quit_after = Some(generations);
        self
    }

    /// Validates the options.
    pub fn validate(&self) -> Result<(), Error> {
        if self.generations == 0 {
            return Err(Error::ZeroGenerations);
        }
        for (name, value) in [("p_mutate", self.p_mutate), ("p_crossover", self.p_crossover)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidProbability { name, value });
            }
        }
        if self.refresh_after == Some(0) {
            return Err(Error::ZeroThreshold("refresh_after"));
        }
        if self.quit_after == Some(0) {
            return Err(Error::ZeroThreshold("quit_after"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_engine_config() {
        let config = EngineConfig::default();
        assert!((config.abs_weight - 0.25).abs() < 1e-12);
        assert!((config.rel_weight - 0.75).abs() < 1e-12);
        assert!(config.seed.is_none());
        assert!(!config.parallel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let config = EngineConfig::default().with_weights(0.5, 0.6);
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidWeights { .. })
        ));
    }

    #[test]
    fn test_weights_must_be_probabilities() {
        let config = EngineConfig::default().with_weights(-0.5, 1.5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_engine_config_builders() {
        let config = EngineConfig::default()
            .with_weights(1.0, 0.0)
            .with_seed(7)
            .with_parallel(true);
        assert_eq!(config.seed, Some(7));
        assert!(config.parallel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_run_options_defaults() {
        let opts = RunOptions::new(100, 0.1, 0.5);
        assert!(opts.elitist);
        assert!(opts.refresh_after.is_none());
        assert!(opts.quit_after.is_none());
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_run_options_rejects_zero_generations() {
        let opts = RunOptions::new(0, 0.1, 0.5);
        assert_eq!(opts.validate(), Err(Error::ZeroGenerations));
    }

    #[test]
    fn test_run_options_rejects_bad_probabilities() {
        assert!(matches!(
            RunOptions::new(10, 1.5, 0.5).validate(),
            Err(Error::InvalidProbability {
                name: "p_mutate",
                ..
            })
        ));
        assert!(matches!(
            RunOptions::new(10, 0.5, -0.1).validate(),
            Err(Error::InvalidProbability {
                name: "p_crossover",
                ..
            })
        ));
    }

    #[test]
    fn test_run_options_rejects_zero_thresholds() {
        let opts = RunOptions::new(10, 0.1, 0.5).with_refresh_after(0);
        assert_eq!(opts.validate(), Err(Error::ZeroThreshold("refresh_after")));
        let opts = RunOptions::new(10, 0.1, 0.5).with_quit_after(0);
        assert_eq!(opts.validate(), Err(Error::ZeroThreshold("quit_after")));
    }
}
