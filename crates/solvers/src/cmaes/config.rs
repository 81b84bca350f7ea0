use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration for the CMA-ES strategy.
///
/// In serialized form, every field is optional:
///
/// ```toml
/// population_size = 12
/// step_size = 0.5
/// seed = 42
/// ```
///
/// Deserialization goes through [`Config::new`], so an invalid file is
/// rejected the same way an invalid constructor call is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawConfig", into = "RawConfig")]
pub struct Config {
    population_size: Option<usize>,
    step_size: f64,
    seed: Option<u64>,
}

/// Errors that can occur when validating a CMA-ES config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("population_size must be at least 2")]
    PopulationSize,

    #[error("step_size must be finite and positive")]
    StepSize,
}

const DEFAULT_STEP_SIZE: f64 = 0.4;

impl Default for Config {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(None, DEFAULT_STEP_SIZE).unwrap()
    }
}

impl Config {
    /// Creates a new config.
    ///
    /// A `population_size` of `None` selects `4 + floor(3 ln N)` once the
    /// dimension `N` is known.
    ///
    /// # Errors
    ///
    /// Returns an error if `population_size` is below 2, or if `step_size` is
    /// not finite and positive.
    pub fn new(population_size: Option<usize>, step_size: f64) -> Result<Self, ConfigError> {
        if population_size.is_some_and(|lambda| lambda < 2) {
            return Err(ConfigError::PopulationSize);
        }
        validate_step_size(step_size)?;

        Ok(Self {
            population_size,
            step_size,
            seed: None,
        })
    }

    /// Seeds the random stream, making runs reproducible.
    ///
    /// Without a seed, the stream is seeded from system entropy.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Returns the requested population size, if one was set.
    #[must_use]
    pub fn population_size(&self) -> Option<usize> {
        self.population_size
    }

    /// Returns the initial step size.
    #[must_use]
    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

pub(super) fn validate_step_size(step_size: f64) -> Result<(), ConfigError> {
    if step_size.is_finite() && step_size > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::StepSize)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    population_size: Option<usize>,

    #[serde(default = "default_step_size")]
    step_size: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

fn default_step_size() -> f64 {
    DEFAULT_STEP_SIZE
}

impl TryFrom<RawConfig> for Config {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let config = Self::new(raw.population_size, raw.step_size)?;
        Ok(match raw.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        })
    }
}

impl From<Config> for RawConfig {
    fn from(config: Config) -> Self {
        Self {
            population_size: config.population_size,
            step_size: config.step_size,
            seed: config.seed,
        }
    }
}
