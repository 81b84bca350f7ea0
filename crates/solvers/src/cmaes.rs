//! Covariance matrix adaptation evolution strategy (CMA-ES).
//!
//! # Algorithm
//!
//! CMA-ES searches with a multivariate normal distribution `N(m, σ²C)`. Each
//! generation it samples `λ` candidates, ranks them, and moves the mean toward
//! a weighted recombination of the best `μ = floor(λ/2)`. Two evolution paths
//! accumulate the mean's movement across generations: one adapts the
//! covariance `C` (rank-one update, combined with a rank-μ update from the
//! current parents), and one adapts the global step size `σ`.
//!
//! Sampling uses the eigendecomposition `C = B·diag(D)²·Bᵀ`, which is only
//! refreshed once enough generations have passed for `C` to change
//! noticeably.
//!
//! # When to Use
//!
//! CMA-ES is appropriate when:
//! - The objective is continuous but derivatives are unavailable or unreliable
//! - The problem is ill-conditioned or non-separable
//! - The dimension is moderate (up to a few hundred parameters)
//!
//! # Numerical Recovery
//!
//! A covariance with non-finite entries, a failed eigendecomposition, or an
//! eigenvalue clearly below zero resets the distribution shape to an isotropic
//! one around the current mean. A step size that becomes non-finite or
//! non-positive keeps its previous value and triggers the same reset. These
//! recoveries are logged with `tracing::warn!` and never end a run.
//!
//! # Stagnation
//!
//! The strategy reports that it is stagnating if any of these hold:
//! - `σ` is not positive
//! - the principal axes differ in length by more than a factor of `1e14`
//! - a tenth of a standard deviation along a principal axis leaves the mean
//!   unchanged in floating point
//!
//! An [`Optimizer`](crate::optimizer::Optimizer) then restarts it from the
//! initial mean and step size while the random stream continues.
//!
//! # Usage
//!
//! [`CmaEs`] is a [`Strategy`]; run it with an
//! [`Optimizer`](crate::optimizer::Optimizer).

mod checkpoint;
mod config;
mod error;
mod parameters;
mod state;


pub use checkpoint::Checkpoint;
pub use config::{Config, ConfigError};
pub use error::Error;
pub use parameters::Parameters;

use nalgebra::{DMatrix, DVector};
use rand::{Rng, SeedableRng, rngs::StdRng};
use skein_core::{Objective, Sample, rank};
use tracing::{debug, warn};

use crate::optimizer::Strategy;

use config::validate_step_size;
use state::State;

/// The CMA-ES strategy.
///
/// The random source `R` is owned by the strategy. Its construction-time value
/// is kept so that [`reset`](Strategy::reset) replays the same random stream.
#[derive(Debug, Clone)]
pub struct CmaEs<R = StdRng> {
    parameters: Parameters,
    state: State,
    initial_state: State,
    rng: R,
    initial_rng: R,
    pending: Vec<DVector<f64>>,
}

impl CmaEs<StdRng> {
    /// Creates a CMA-ES strategy around `initial_mean`.
    ///
    /// The random stream is seeded from the config seed if there is one, and
    /// from system entropy otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if `initial_mean` does not match
    /// the objective's dimension.
    pub fn new(objective: &Objective, initial_mean: &[f64], config: &Config) -> Result<Self, Error> {
        let rng = match config.seed() {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(objective, initial_mean, config, rng)
    }
}

impl<R: Rng + Clone> CmaEs<R> {
    /// Creates a CMA-ES strategy that draws from `rng`.
    ///
    /// The config seed is ignored. An initial mean outside the objective's
    /// bounds is clipped into them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if `initial_mean` does not match
    /// the objective's dimension.
    pub fn with_rng(
        objective: &Objective,
        initial_mean: &[f64],
        config: &Config,
        rng: R,
    ) -> Result<Self, Error> {
        let dimension = objective.dimension();
        if initial_mean.len() != dimension {
            return Err(Error::DimensionMismatch {
                expected: dimension,
                found: initial_mean.len(),
            });
        }

        let mean = if objective.contains(initial_mean) {
            initial_mean.to_vec()
        } else {
            let clipped = objective.clip(initial_mean);
            warn!(?initial_mean, ?clipped, "initial mean clipped into bounds");
            clipped
        };

        let parameters = Parameters::new(dimension, config.population_size());
        let state = State::new(DVector::from_vec(mean), config.step_size());

        Ok(Self {
            parameters,
            initial_state: state.clone(),
            state,
            initial_rng: rng.clone(),
            rng,
            pending: Vec::new(),
        })
    }

    /// Replaces the random stream.
    ///
    /// The new stream also becomes the one [`reset`](Strategy::reset) returns
    /// to.
    pub fn set_rng(&mut self, rng: R) {
        self.initial_rng = rng.clone();
        self.rng = rng;
    }

    /// Returns the current global step size `σ`.
    #[must_use]
    pub fn step_size(&self) -> f64 {
        self.state.sigma
    }

    /// Sets the global step size `σ`.
    ///
    /// # Errors
    ///
    /// Returns an error if `step_size` is not finite and positive. The
    /// strategy is left unchanged.
    pub fn set_step_size(&mut self, step_size: f64) -> Result<(), ConfigError> {
        validate_step_size(step_size)?;
        self.state.sigma = step_size;
        Ok(())
    }

    /// Returns the distribution mean `m`.
    #[must_use]
    pub fn mean(&self) -> &[f64] {
        self.state.mean.as_slice()
    }

    /// Returns the covariance matrix `C`.
    #[must_use]
    pub fn covariance(&self) -> &DMatrix<f64> {
        &self.state.covariance
    }

    /// Returns the eigenbasis `B` from the most recent decomposition of `C`.
    #[must_use]
    pub fn eigenbasis(&self) -> &DMatrix<f64> {
        &self.state.eigenbasis
    }

    /// Returns `D`, the square roots of the eigenvalues of `C` from the most
    /// recent decomposition.
    #[must_use]
    pub fn sqrt_eigenvalues(&self) -> &DVector<f64> {
        &self.state.sqrt_eigenvalues
    }

    /// Returns the number of completed generations.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.state.generation
    }

    #[must_use]
    pub fn population_size(&self) -> usize {
        self.parameters.population_size
    }

    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Captures the adapted distribution.
    #[must_use]
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint::from(&self.state)
    }

    /// Replaces the adapted distribution with a checkpoint.
    ///
    /// Any proposal awaiting its update is discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkpoint's dimension differs from this
    /// strategy's, or if its step size is not finite and positive. The
    /// strategy is left unchanged.
    pub fn restore(&mut self, checkpoint: Checkpoint) -> Result<(), Error> {
        self.state = State::from_checkpoint(checkpoint, self.parameters.dimension)?;
        self.pending.clear();
        Ok(())
    }
}

impl<R: Rng + Clone> Strategy for CmaEs<R> {
    fn dimension(&self) -> usize {
        self.parameters.dimension
    }

    fn propose(&mut self) -> Vec<Vec<f64>> {
        self.pending = self
            .state
            .sample(&mut self.rng, self.parameters.population_size);

        self.pending
            .iter()
            .map(|candidate| candidate.as_slice().to_vec())
            .collect()
    }

    fn update(&mut self, samples: &[Sample]) {
        let pending = std::mem::take(&mut self.pending);
        if pending.is_empty() || pending.len() != samples.len() {
            warn!(
                proposed = pending.len(),
                received = samples.len(),
                "samples do not match the last proposal, skipping update"
            );
            return;
        }

        let order = rank(samples);
        let parents: Vec<&DVector<f64>> = order
            .iter()
            .take(self.parameters.parent_number)
            .map(|&index| &pending[index])
            .collect();

        self.state.update(&self.parameters, &parents);

        debug!(
            generation = self.state.generation,
            sigma = self.state.sigma,
            best_objective_value = samples[order[0]].objective_value,
            "cma-es generation"
        );
    }

    fn reset(&mut self) {
        self.state = self.initial_state.clone();
        self.rng = self.initial_rng.clone();
        self.pending.clear();
    }

    fn is_stagnating(&self) -> bool {
        self.state.is_stagnating()
    }

    /// Starts over from the initial mean and step size.
    ///
    /// Unlike [`reset`](Strategy::reset), the random stream continues, so the
    /// restarted search explores new candidates.
    fn restart(&mut self) {
        debug!(
            generation = self.state.generation,
            sigma = self.state.sigma,
            "cma-es restart"
        );
        self.state = self.initial_state.clone();
        self.pending.clear();
    }
}
