use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Termination and finish criteria for an optimizer run.
///
/// - The run is *finished* once the best objective value is at or below the
///   acceptable objective value.
/// - The run is *terminated* once the number of iterations or the number of
///   evaluations reaches its maximum.
///
/// Both maxima are unbounded and the acceptable objective value is negative
/// infinity by default, so a default run only ends when an observer stops it.
///
/// In serialized form, a missing field takes its default value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTermination", into = "RawTermination")]
pub struct Termination {
    max_iterations: Option<usize>,
    max_evaluations: Option<usize>,
    acceptable_objective_value: f64,
}

/// Errors that can occur when validating termination criteria.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("acceptable_objective_value must not be NaN")]
    AcceptableObjectiveValue,
}

impl Default for Termination {
    fn default() -> Self {
        Self {
            max_iterations: None,
            max_evaluations: None,
            acceptable_objective_value: f64::NEG_INFINITY,
        }
    }
}

impl Termination {
    /// Creates validated termination criteria.
    ///
    /// # Errors
    ///
    /// Returns an error if `acceptable_objective_value` is NaN.
    pub fn new(
        max_iterations: Option<usize>,
        max_evaluations: Option<usize>,
        acceptable_objective_value: f64,
    ) -> Result<Self, ConfigError> {
        if acceptable_objective_value.is_nan() {
            return Err(ConfigError::AcceptableObjectiveValue);
        }

        Ok(Self {
            max_iterations,
            max_evaluations,
            acceptable_objective_value,
        })
    }

    #[must_use]
    pub fn max_iterations(&self) -> Option<usize> {
        self.max_iterations
    }

    #[must_use]
    pub fn max_evaluations(&self) -> Option<usize> {
        self.max_evaluations
    }

    #[must_use]
    pub fn acceptable_objective_value(&self) -> f64 {
        self.acceptable_objective_value
    }

    pub(super) fn set_max_iterations(&mut self, max_iterations: Option<usize>) {
        self.max_iterations = max_iterations;
    }

    pub(super) fn set_max_evaluations(&mut self, max_evaluations: Option<usize>) {
        self.max_evaluations = max_evaluations;
    }

    pub(super) fn set_acceptable_objective_value(
        &mut self,
        acceptable_objective_value: f64,
    ) -> Result<(), ConfigError> {
        *self = Self::new(
            self.max_iterations,
            self.max_evaluations,
            acceptable_objective_value,
        )?;
        Ok(())
    }

    /// Returns true if `best_objective_value` is acceptable.
    #[must_use]
    pub fn is_finished(&self, best_objective_value: f64) -> bool {
        best_objective_value <= self.acceptable_objective_value
    }

    /// Returns true if either maximum has been reached.
    #[must_use]
    pub fn is_terminated(&self, iterations: usize, evaluations: usize) -> bool {
        self.max_iterations.is_some_and(|max| iterations >= max)
            || self.max_evaluations.is_some_and(|max| evaluations >= max)
    }
}

/// Serialized form of [`Termination`].
///
/// Infinite acceptable objective values are not representable in every
/// format, so "no acceptable value" is encoded as an absent field.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
struct RawTermination {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_iterations: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    max_evaluations: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    acceptable_objective_value: Option<f64>,
}

impl TryFrom<RawTermination> for Termination {
    type Error = ConfigError;

    fn try_from(raw: RawTermination) -> Result<Self, Self::Error> {
        Self::new(
            raw.max_iterations,
            raw.max_evaluations,
            raw.acceptable_objective_value
                .unwrap_or(f64::NEG_INFINITY),
        )
    }
}

impl From<Termination> for RawTermination {
    fn from(termination: Termination) -> Self {
        let acceptable = termination.acceptable_objective_value;
        Self {
            max_iterations: termination.max_iterations,
            max_evaluations: termination.max_evaluations,
            acceptable_objective_value: (acceptable != f64::NEG_INFINITY).then_some(acceptable),
        }
    }
}
