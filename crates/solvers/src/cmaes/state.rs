use nalgebra::{DMatrix, DVector, SymmetricEigen};
use rand::Rng;
use rand_distr::StandardNormal;
use tracing::warn;

use super::Parameters;

/// Eigenvalue that replaces round-off zeros and tiny negatives.
const TINY_EIGENVALUE: f64 = 1e-20;

/// Relative tolerance below zero that still counts as round-off.
const EIGENVALUE_TOLERANCE: f64 = 1e-9;

/// Largest ratio between the longest and shortest axis of the distribution.
const MAX_AXIS_RATIO: f64 = 1e14;

/// The adapted search distribution.
///
/// `C = B·diag(D)²·Bᵀ` holds between eigendecompositions only approximately,
/// since `B` and `D` are refreshed lazily.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct State {
    pub(super) mean: DVector<f64>,
    pub(super) sigma: f64,
    pub(super) covariance: DMatrix<f64>,
    pub(super) eigenbasis: DMatrix<f64>,
    pub(super) sqrt_eigenvalues: DVector<f64>,
    pub(super) p_c: DVector<f64>,
    pub(super) p_sigma: DVector<f64>,
    pub(super) generation: usize,
    pub(super) eigen_generation: usize,
}

/// Why the distribution had to be reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Instability {
    NonFiniteMean,
    NonFiniteCovariance,
    DecompositionFailed,
    NegativeEigenvalue,
    StepSize,
}

impl State {
    pub(super) fn new(mean: DVector<f64>, sigma: f64) -> Self {
        let n = mean.len();
        Self {
            mean,
            sigma,
            covariance: DMatrix::identity(n, n),
            eigenbasis: DMatrix::identity(n, n),
            sqrt_eigenvalues: DVector::from_element(n, 1.0),
            p_c: DVector::zeros(n),
            p_sigma: DVector::zeros(n),
            generation: 0,
            eigen_generation: 0,
        }
    }

    /// Draws `count` candidates `m + σ·B·(D∘z)` with `z ~ N(0, I)`.
    pub(super) fn sample<R: Rng>(&self, rng: &mut R, count: usize) -> Vec<DVector<f64>> {
        let n = self.mean.len();
        let transform = &self.eigenbasis * DMatrix::from_diagonal(&self.sqrt_eigenvalues);

        (0..count)
            .map(|_| {
                let z = DVector::from_fn(n, |_, _| rng.sample::<f64, _>(StandardNormal));
                &self.mean + self.sigma * &transform * z
            })
            .collect()
    }

    /// Advances the distribution by one generation.
    ///
    /// `parents` are the `μ` best candidates of the generation, best first.
    pub(super) fn update(&mut self, parameters: &Parameters, parents: &[&DVector<f64>]) {
        debug_assert_eq!(parents.len(), parameters.parent_number);

        let n = parameters.dimension as f64;
        let old_mean = self.mean.clone();

        let mut new_mean = old_mean.clone();
        for (&weight, &parent) in parameters.weights.iter().zip(parents) {
            new_mean += weight * (parent - &old_mean);
        }
        let displacement = (&new_mean - &old_mean) / self.sigma;

        // C^{-1/2} = B·D⁻¹·Bᵀ
        let inverse_sqrt = self.sqrt_eigenvalues.map(|d| 1.0 / d);
        let c_inv_sqrt = &self.eigenbasis
            * DMatrix::from_diagonal(&inverse_sqrt)
            * self.eigenbasis.transpose();

        let c_sigma = parameters.c_sigma;
        self.p_sigma = (1.0 - c_sigma) * &self.p_sigma
            + (c_sigma * (2.0 - c_sigma) * parameters.mu_eff).sqrt() * &c_inv_sqrt * &displacement;
        let p_sigma_norm = self.p_sigma.norm();

        let generation_factor =
            (1.0 - (1.0 - c_sigma).powf(2.0 * (self.generation + 1) as f64)).sqrt();
        let h_sigma = if p_sigma_norm / generation_factor
            < (1.4 + 2.0 / (n + 1.0)) * parameters.chi_n
        {
            1.0
        } else {
            0.0
        };

        let c_c = parameters.c_c;
        self.p_c = (1.0 - c_c) * &self.p_c
            + h_sigma * (c_c * (2.0 - c_c) * parameters.mu_eff).sqrt() * &displacement;

        let mut rank_mu = DMatrix::zeros(parameters.dimension, parameters.dimension);
        for (&weight, &parent) in parameters.weights.iter().zip(parents) {
            let y = (parent - &old_mean) / self.sigma;
            rank_mu += weight * &y * y.transpose();
        }

        let c_1 = parameters.c_1;
        let c_mu = parameters.c_mu;
        let stalled = (1.0 - h_sigma) * c_c * (2.0 - c_c);
        self.covariance = (1.0 - c_1 - c_mu) * &self.covariance
            + c_1 * (&self.p_c * self.p_c.transpose() + stalled * &self.covariance)
            + c_mu * rank_mu;

        let exponent = (c_sigma / parameters.d_sigma) * (p_sigma_norm / parameters.chi_n - 1.0);
        // Unlike `min`, `clamp` keeps a NaN exponent.
        let sigma = self.sigma * exponent.clamp(f64::NEG_INFINITY, 1.0).exp();

        self.covariance = (&self.covariance + self.covariance.transpose()) * 0.5;

        let outcome = if new_mean.iter().any(|m| !m.is_finite()) {
            Err(Instability::NonFiniteMean)
        } else if !(sigma.is_finite() && sigma > 0.0) {
            self.mean = new_mean;
            Err(Instability::StepSize)
        } else {
            self.mean = new_mean;
            self.sigma = sigma;
            if self.covariance.iter().any(|c| !c.is_finite()) {
                Err(Instability::NonFiniteCovariance)
            } else if (self.generation + 1 - self.eigen_generation) as f64 > parameters.eigen_gap
            {
                self.eigen_generation = self.generation + 1;
                self.refresh_eigensystem()
            } else {
                Ok(())
            }
        };

        if let Err(instability) = outcome {
            self.recover(instability);
        }

        self.generation += 1;
    }

    /// Returns true if the distribution can no longer move.
    ///
    /// The mean is stuck once a tenth of a standard deviation along a
    /// principal axis rounds away. The axis tested cycles with the generation.
    pub(super) fn is_stagnating(&self) -> bool {
        if self.sigma.is_nan() || self.sigma <= 0.0 {
            return true;
        }

        if self.sqrt_eigenvalues.max() > MAX_AXIS_RATIO * self.sqrt_eigenvalues.min() {
            return true;
        }

        let axis = self.generation % self.mean.len();
        let scale = 0.1 * self.sigma * self.sqrt_eigenvalues[axis];
        self.mean
            .iter()
            .zip(self.eigenbasis.column(axis).iter())
            .all(|(&m, &b)| m + scale * b == m)
    }

    /// Recomputes `B` and `D` from `C`.
    fn refresh_eigensystem(&mut self) -> Result<(), Instability> {
        let eigen = SymmetricEigen::try_new(self.covariance.clone(), f64::EPSILON, 0)
            .ok_or(Instability::DecompositionFailed)?;

        let largest = eigen.eigenvalues.max();
        let tolerance = -EIGENVALUE_TOLERANCE * largest.max(1.0);

        let mut eigenvalues = eigen.eigenvalues;
        for value in eigenvalues.iter_mut() {
            if !value.is_finite() {
                return Err(Instability::DecompositionFailed);
            }
            if *value < tolerance {
                return Err(Instability::NegativeEigenvalue);
            }
            if *value <= 0.0 {
                *value = TINY_EIGENVALUE;
            }
        }

        self.eigenbasis = eigen.eigenvectors;
        self.sqrt_eigenvalues = eigenvalues.map(f64::sqrt);
        Ok(())
    }

    /// Resets the shape of the distribution around the current mean.
    fn recover(&mut self, instability: Instability) {
        warn!(
            generation = self.generation,
            sigma = self.sigma,
            ?instability,
            "numerical instability, resetting covariance"
        );

        let n = self.mean.len();
        self.covariance = DMatrix::identity(n, n) * (self.sigma * self.sigma);
        self.eigenbasis = DMatrix::identity(n, n);
        self.sqrt_eigenvalues = DVector::from_element(n, self.sigma);
        self.p_c = DVector::zeros(n);
        self.p_sigma = DVector::zeros(n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use rand::{SeedableRng, rngs::StdRng};

    fn parameters() -> Parameters {
        Parameters::new(3, None)
    }

    #[test]
    fn initial_distribution_is_isotropic() {
        let state = State::new(DVector::from_vec(vec![1.0, 2.0, 3.0]), 0.5);

        assert_eq!(state.covariance, DMatrix::identity(3, 3));
        assert_eq!(state.eigenbasis, DMatrix::identity(3, 3));
        assert_eq!(state.sqrt_eigenvalues, DVector::from_element(3, 1.0));
        assert_eq!(state.p_c, DVector::zeros(3));
        assert_eq!(state.p_sigma, DVector::zeros(3));
        assert_eq!(state.generation, 0);
    }

    #[test]
    fn samples_are_centered_on_the_mean() {
        let state = State::new(DVector::from_vec(vec![5.0, -5.0]), 0.1);
        let mut rng = StdRng::seed_from_u64(0);

        let samples = state.sample(&mut rng, 2_000);
        let mean = samples.iter().fold(DVector::zeros(2), |sum, x| sum + x) / 2_000.0;

        assert_eq!(samples.len(), 2_000);
        assert_relative_eq!(mean[0], 5.0, epsilon = 0.01);
        assert_relative_eq!(mean[1], -5.0, epsilon = 0.01);
    }

    #[test]
    fn update_moves_mean_toward_parents() {
        let parameters = parameters();
        let mut state = State::new(DVector::zeros(3), 1.0);
        let parent = DVector::from_element(3, 1.0);
        let parents = vec![&parent; parameters.parent_number];

        state.update(&parameters, &parents);

        for value in state.mean.iter() {
            assert_relative_eq!(*value, 1.0, epsilon = 1e-12);
        }
        assert_eq!(state.generation, 1);
        assert!(state.sigma > 0.0);
        assert_eq!(state.covariance, state.covariance.transpose());
    }

    #[test]
    fn sigma_increase_is_capped_at_e_fold() {
        let parameters = parameters();
        let mut state = State::new(DVector::zeros(3), 1.0);
        let parent = DVector::from_element(3, 1e6);
        let parents = vec![&parent; parameters.parent_number];

        state.update(&parameters, &parents);

        assert!(state.sigma <= std::f64::consts::E * (1.0 + 1e-12));
    }

    #[test]
    fn non_finite_update_recovers() {
        let parameters = parameters();
        let mut state = State::new(DVector::zeros(3), 2.0);
        let parent = DVector::from_element(3, f64::INFINITY);
        let parents = vec![&parent; parameters.parent_number];

        state.update(&parameters, &parents);

        assert_eq!(state.mean, DVector::zeros(3));
        assert_relative_eq!(state.sigma, 2.0);
        assert_eq!(state.covariance, DMatrix::identity(3, 3) * 4.0);
        assert_eq!(state.eigenbasis, DMatrix::identity(3, 3));
        assert_eq!(state.sqrt_eigenvalues, DVector::from_element(3, 2.0));
        assert_eq!(state.p_c, DVector::zeros(3));
        assert_eq!(state.p_sigma, DVector::zeros(3));
        assert_eq!(state.generation, 1);
    }

    #[test]
    fn negative_eigenvalue_recovers() {
        let mut state = State::new(DVector::zeros(2), 0.5);
        state.covariance = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0]);

        assert_eq!(
            state.refresh_eigensystem(),
            Err(Instability::NegativeEigenvalue)
        );
    }

    #[test]
    fn fresh_distribution_is_not_stagnating() {
        assert!(!State::new(DVector::from_element(3, 1.0), 0.5).is_stagnating());
    }

    #[test]
    fn non_positive_step_size_is_stagnating() {
        let mut state = State::new(DVector::zeros(3), 0.5);

        state.sigma = 0.0;
        assert!(state.is_stagnating());

        state.sigma = f64::NAN;
        assert!(state.is_stagnating());
    }

    #[test]
    fn degenerate_axis_ratio_is_stagnating() {
        let mut state = State::new(DVector::zeros(3), 0.5);

        state.sqrt_eigenvalues = DVector::from_vec(vec![1e7, 1.0, 1e-6]);
        assert!(!state.is_stagnating());

        state.sqrt_eigenvalues = DVector::from_vec(vec![1e8, 1.0, 1e-7]);
        assert!(state.is_stagnating());
    }

    #[test]
    fn step_lost_in_round_off_is_stagnating() {
        let state = State::new(DVector::from_element(3, 1e20), 1.0);
        assert!(state.is_stagnating());

        let state = State::new(DVector::from_element(3, 1e3), 1.0);
        assert!(!state.is_stagnating());
    }

    #[test]
    fn round_off_eigenvalues_are_floored() {
        let mut state = State::new(DVector::zeros(2), 0.5);
        state.covariance = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, -1e-12]);

        assert_eq!(state.refresh_eigensystem(), Ok(()));
        assert!(state.sqrt_eigenvalues.iter().all(|&d| d > 0.0));
    }
}
