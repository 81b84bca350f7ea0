use nalgebra::DVector;

/// Strategy parameters derived from the dimension and population size.
///
/// These are fixed at construction and never adapted.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    /// Number of parameters, `N`.
    pub dimension: usize,

    /// Number of candidates per generation, `λ`.
    pub population_size: usize,

    /// Number of candidates recombined into the new mean, `μ = floor(λ/2)`.
    pub parent_number: usize,

    /// Recombination weights for the `μ` best candidates, summing to 1.
    pub weights: DVector<f64>,

    /// Variance-effective selection mass, `1 / Σ w_i²`.
    pub mu_eff: f64,

    /// Learning rate of the covariance evolution path.
    pub c_c: f64,

    /// Learning rate of the step-size evolution path.
    pub c_sigma: f64,

    /// Rank-one update learning rate.
    pub c_1: f64,

    /// Rank-μ update learning rate.
    pub c_mu: f64,

    /// Step-size damping.
    pub d_sigma: f64,

    /// Expected norm of an `N`-dimensional standard normal vector.
    pub chi_n: f64,

    /// Minimum number of generations between eigendecompositions.
    pub eigen_gap: f64,
}

impl Parameters {
    /// Derives the parameters for `dimension` with an optional population
    /// size override.
    ///
    /// `dimension` must be non-zero and `population_size` at least 2.
    pub(super) fn new(dimension: usize, population_size: Option<usize>) -> Self {
        debug_assert!(dimension > 0, "dimension must be non-zero");

        let n = dimension as f64;
        let population_size =
            population_size.unwrap_or_else(|| 4 + (3.0 * n.ln()).floor() as usize);
        let parent_number = population_size / 2;

        let offset = (parent_number as f64 + 0.5).ln();
        let raw_weights: Vec<f64> = (1..=parent_number)
            .map(|i| offset - (i as f64).ln())
            .collect();
        let weight_sum: f64 = raw_weights.iter().sum();
        let weights = DVector::from_iterator(
            parent_number,
            raw_weights.iter().map(|w| w / weight_sum),
        );

        let mu_eff = 1.0 / weights.iter().map(|w| w * w).sum::<f64>();

        let c_c = 4.0 / (n + 4.0);
        let c_sigma = (mu_eff + 2.0) / (n + mu_eff + 3.0);
        let c_1 = 2.0 / ((n + 1.3).powi(2) + mu_eff);
        let c_mu =
            (2.0 * (mu_eff - 2.0 + 1.0 / mu_eff) / ((n + 2.0).powi(2) + mu_eff)).min(1.0 - c_1);
        let d_sigma = 1.0 + 2.0 * (((mu_eff - 1.0) / (n + 1.0)).sqrt() - 1.0).max(0.0) + c_sigma;

        let chi_n = n.sqrt() * (1.0 - 1.0 / (4.0 * n) + 1.0 / (21.0 * n * n));
        let eigen_gap = 1.0 / ((c_1 + c_mu) * n * 10.0);

        Self {
            dimension,
            population_size,
            parent_number,
            weights,
            mu_eff,
            c_c,
            c_sigma,
            c_1,
            c_mu,
            d_sigma,
            chi_n,
            eigen_gap,
        }
    }
}
