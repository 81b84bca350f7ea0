use std::{fmt, sync::Arc};

use thiserror::Error;

type ObjectiveFn = dyn Fn(&[f64]) -> f64 + Send + Sync;

/// A black-box objective function to be minimized.
///
/// The objective is a plain closure captured at construction. It may be
/// paired with a soft-constraints closure, whose value measures how far a
/// parameter is from feasibility (zero when feasible), and with per-element
/// bounds.
///
/// Bounds are used to validate and clip starting points only. Strategies are
/// free to sample outside them during a run.
///
/// Cloning an `Objective` is cheap: the closures are shared.
#[derive(Clone)]
pub struct Objective {
    dimension: usize,
    function: Arc<ObjectiveFn>,
    soft_constraints: Option<Arc<ObjectiveFn>>,
    lower_bounds: Vec<f64>,
    upper_bounds: Vec<f64>,
}

/// Errors that can occur when building an [`Objective`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveError {
    #[error("dimension must be at least 1")]
    ZeroDimension,

    #[error("expected {expected} bounds, found {found}")]
    BoundsLength { expected: usize, found: usize },

    #[error("bounds at index {index} are NaN or inverted")]
    InvalidBounds { index: usize },
}

impl Objective {
    /// Creates an unbounded objective over `dimension` parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectiveError::ZeroDimension`] if `dimension` is zero.
    pub fn new<F>(dimension: usize, function: F) -> Result<Self, ObjectiveError>
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        if dimension == 0 {
            return Err(ObjectiveError::ZeroDimension);
        }

        Ok(Self {
            dimension,
            function: Arc::new(function),
            soft_constraints: None,
            lower_bounds: vec![f64::NEG_INFINITY; dimension],
            upper_bounds: vec![f64::INFINITY; dimension],
        })
    }

    /// Attaches a soft-constraints function.
    ///
    /// Candidates with a smaller soft-constraints value always rank ahead of
    /// candidates with a larger one, regardless of their objective values.
    #[must_use]
    pub fn with_soft_constraints<G>(mut self, soft_constraints: G) -> Self
    where
        G: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        self.soft_constraints = Some(Arc::new(soft_constraints));
        self
    }

    /// Sets per-element lower and upper bounds.
    ///
    /// # Errors
    ///
    /// Returns an error if either bound has the wrong length, or if any bound
    /// is NaN or any lower bound exceeds its upper bound.
    pub fn with_bounds(
        mut self,
        lower_bounds: Vec<f64>,
        upper_bounds: Vec<f64>,
    ) -> Result<Self, ObjectiveError> {
        for bounds in [&lower_bounds, &upper_bounds] {
            if bounds.len() != self.dimension {
                return Err(ObjectiveError::BoundsLength {
                    expected: self.dimension,
                    found: bounds.len(),
                });
            }
        }
        if let Some(index) = lower_bounds
            .iter()
            .zip(&upper_bounds)
            .position(|(lower, upper)| lower.is_nan() || upper.is_nan() || lower > upper)
        {
            return Err(ObjectiveError::InvalidBounds { index });
        }

        self.lower_bounds = lower_bounds;
        self.upper_bounds = upper_bounds;
        Ok(self)
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Computes the objective value at `x`.
    #[must_use]
    pub fn value(&self, x: &[f64]) -> f64 {
        (self.function)(x)
    }

    /// Computes the soft-constraints value at `x`.
    ///
    /// Returns `0.0` when no soft-constraints function is attached.
    #[must_use]
    pub fn soft_constraints_value(&self, x: &[f64]) -> f64 {
        self.soft_constraints.as_ref().map_or(0.0, |g| g(x))
    }

    #[must_use]
    pub fn lower_bounds(&self) -> &[f64] {
        &self.lower_bounds
    }

    #[must_use]
    pub fn upper_bounds(&self) -> &[f64] {
        &self.upper_bounds
    }

    /// Returns true if every element of `x` lies within the bounds.
    #[must_use]
    pub fn contains(&self, x: &[f64]) -> bool {
        x.len() == self.dimension
            && x.iter()
                .zip(self.lower_bounds.iter().zip(&self.upper_bounds))
                .all(|(v, (lower, upper))| lower <= v && v <= upper)
    }

    /// Returns a copy of `x` with every element clamped into the bounds.
    #[must_use]
    pub fn clip(&self, x: &[f64]) -> Vec<f64> {
        x.iter()
            .zip(self.lower_bounds.iter().zip(&self.upper_bounds))
            .map(|(v, (lower, upper))| v.clamp(*lower, *upper))
            .collect()
    }
}

impl fmt::Debug for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Objective")
            .field("dimension", &self.dimension)
            .field("soft_constraints", &self.soft_constraints.is_some())
            .field("lower_bounds", &self.lower_bounds)
            .field("upper_bounds", &self.upper_bounds)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn sphere(x: &[f64]) -> f64 {
        x.iter().map(|v| v * v).sum()
    }

    #[test]
    fn evaluates_closure() {
        let objective = Objective::new(3, sphere).unwrap();

        assert_eq!(objective.dimension(), 3);
        assert_relative_eq!(objective.value(&[1.0, 2.0, 3.0]), 14.0);
    }

    #[test]
    fn soft_constraints_default_to_zero() {
        let objective = Objective::new(2, sphere).unwrap();
        assert_relative_eq!(objective.soft_constraints_value(&[5.0, 5.0]), 0.0);

        let constrained = objective.with_soft_constraints(|x| (x[0] - 1.0).max(0.0));
        assert_relative_eq!(constrained.soft_constraints_value(&[5.0, 5.0]), 4.0);
        assert_relative_eq!(constrained.soft_constraints_value(&[0.5, 5.0]), 0.0);
    }

    #[test]
    fn rejects_zero_dimension() {
        let err = Objective::new(0, sphere).unwrap_err();
        assert_eq!(err, ObjectiveError::ZeroDimension);
    }

    #[test]
    fn rejects_bad_bounds() {
        let objective = Objective::new(2, sphere).unwrap();

        let err = objective
            .clone()
            .with_bounds(vec![0.0], vec![1.0, 1.0])
            .unwrap_err();
        assert_eq!(
            err,
            ObjectiveError::BoundsLength {
                expected: 2,
                found: 1
            }
        );

        let err = objective
            .with_bounds(vec![0.0, 2.0], vec![1.0, 1.0])
            .unwrap_err();
        assert_eq!(err, ObjectiveError::InvalidBounds { index: 1 });

        let err = Objective::new(2, sphere)
            .unwrap()
            .with_bounds(vec![f64::NAN, 0.0], vec![1.0, 1.0])
            .unwrap_err();
        assert_eq!(err, ObjectiveError::InvalidBounds { index: 0 });
    }

    #[test]
    fn unbounded_by_default() {
        let objective = Objective::new(2, sphere).unwrap();
        assert!(objective.contains(&[1e300, -1e300]));
        assert_eq!(objective.clip(&[1e300, -1e300]), vec![1e300, -1e300]);
    }

    #[test]
    fn clips_into_bounds() {
        let objective = Objective::new(3, sphere)
            .unwrap()
            .with_bounds(vec![-1.0, -1.0, -1.0], vec![1.0, 1.0, 1.0])
            .unwrap();

        assert!(!objective.contains(&[2.0, 0.0, -3.0]));
        assert_eq!(objective.clip(&[2.0, 0.0, -3.0]), vec![1.0, 0.0, -1.0]);
        assert!(objective.contains(&objective.clip(&[2.0, 0.0, -3.0])));
    }
}
