use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use super::{Error, State, config::validate_step_size};

/// A serializable snapshot of the adapted search distribution.
///
/// A checkpoint holds everything CMA-ES adapts between generations. The
/// strategy parameters are derived from the dimension and population size, so
/// restore a checkpoint into a strategy built with the same config.
///
/// The random stream is not part of a checkpoint. Use
/// [`CmaEs::set_rng`](super::CmaEs::set_rng) to seed the restored strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub mean: DVector<f64>,
    pub step_size: f64,
    pub covariance: DMatrix<f64>,
    pub eigenbasis: DMatrix<f64>,
    pub sqrt_eigenvalues: DVector<f64>,
    pub p_c: DVector<f64>,
    pub p_sigma: DVector<f64>,
    pub generation: usize,
    pub eigen_generation: usize,
}

impl Checkpoint {
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.mean.len()
    }
}

impl From<&State> for Checkpoint {
    fn from(state: &State) -> Self {
        Self {
            mean: state.mean.clone(),
            step_size: state.sigma,
            covariance: state.covariance.clone(),
            eigenbasis: state.eigenbasis.clone(),
            sqrt_eigenvalues: state.sqrt_eigenvalues.clone(),
            p_c: state.p_c.clone(),
            p_sigma: state.p_sigma.clone(),
            generation: state.generation,
            eigen_generation: state.eigen_generation,
        }
    }
}

impl State {
    /// Rebuilds a state from a checkpoint for a problem of `dimension`.
    pub(super) fn from_checkpoint(checkpoint: Checkpoint, dimension: usize) -> Result<Self, Error> {
        let vectors = [
            checkpoint.mean.len(),
            checkpoint.sqrt_eigenvalues.len(),
            checkpoint.p_c.len(),
            checkpoint.p_sigma.len(),
        ];
        let matrices = [
            checkpoint.covariance.shape(),
            checkpoint.eigenbasis.shape(),
        ];

        if let Some(&found) = vectors.iter().find(|&&len| len != dimension) {
            return Err(Error::DimensionMismatch {
                expected: dimension,
                found,
            });
        }
        if let Some(&(rows, cols)) = matrices
            .iter()
            .find(|&&(rows, cols)| rows != dimension || cols != dimension)
        {
            return Err(Error::DimensionMismatch {
                expected: dimension,
                found: if rows == dimension { cols } else { rows },
            });
        }
        validate_step_size(checkpoint.step_size)?;

        Ok(Self {
            mean: checkpoint.mean,
            sigma: checkpoint.step_size,
            covariance: checkpoint.covariance,
            eigenbasis: checkpoint.eigenbasis,
            sqrt_eigenvalues: checkpoint.sqrt_eigenvalues,
            p_c: checkpoint.p_c,
            p_sigma: checkpoint.p_sigma,
            generation: checkpoint.generation,
            eigen_generation: checkpoint.eigen_generation.min(checkpoint.generation),
        })
    }
}
