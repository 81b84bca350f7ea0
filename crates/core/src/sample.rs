use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// An evaluated parameter.
///
/// Samples are created once, when a parameter is first evaluated, and never
/// mutated afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// The evaluated parameter.
    pub parameter: Vec<f64>,

    /// The objective value at `parameter`.
    pub objective_value: f64,

    /// The soft-constraints value at `parameter` (zero when feasible).
    pub soft_constraints_value: f64,
}

impl Sample {
    /// Creates a new sample.
    #[must_use]
    pub fn new(parameter: Vec<f64>, objective_value: f64, soft_constraints_value: f64) -> Self {
        Self {
            parameter,
            objective_value,
            soft_constraints_value,
        }
    }

    /// Returns true if both the objective and soft-constraints values are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.objective_value.is_finite() && self.soft_constraints_value.is_finite()
    }

    /// Compares two samples by fitness.
    ///
    /// Soft-constraints values are compared first and objective values break
    /// ties, so constraint violation dominates objective value. Samples with a
    /// NaN or infinite value order after every finite sample and compare equal
    /// to each other.
    #[must_use]
    pub fn cmp_fitness(&self, other: &Self) -> Ordering {
        match (self.is_finite(), other.is_finite()) {
            (true, true) => self
                .soft_constraints_value
                .partial_cmp(&other.soft_constraints_value)
                .unwrap_or(Ordering::Equal)
                .then_with(|| {
                    self.objective_value
                        .partial_cmp(&other.objective_value)
                        .unwrap_or(Ordering::Equal)
                }),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => Ordering::Equal,
        }
    }

    /// Returns true if this sample should replace `incumbent` as the best.
    ///
    /// A sample improves on the incumbent only if it is strictly better under
    /// [`Sample::cmp_fitness`].
    #[must_use]
    pub fn improves_on(&self, incumbent: &Self) -> bool {
        self.cmp_fitness(incumbent) == Ordering::Less
    }
}

/// Returns the indices of `samples` ordered from best to worst.
///
/// Ordering follows [`Sample::cmp_fitness`]. The sort is stable, so samples
/// with equal fitness keep their original relative order.
#[must_use]
pub fn rank(samples: &[Sample]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..samples.len()).collect();
    order.sort_by(|&a, &b| samples[a].cmp_fitness(&samples[b]));
    order
}
