use skein_core::Sample;

/// Tracks the best sample encountered so far.
///
/// The best sample is defined by [`Sample::improves_on`]: lower soft-constraints
/// value first, then lower objective value. The `Option` lets us represent the
/// state before any evaluation.
#[derive(Debug, Default)]
pub(super) struct Best {
    sample: Option<Sample>,
}

impl Best {
    /// Replaces the best sample if `candidate` improves on it.
    pub(super) fn update(&mut self, candidate: &Sample) {
        if let Some(best) = self.sample.as_ref()
            && !candidate.improves_on(best)
        {
            return;
        }
        self.sample = Some(candidate.clone());
    }

    pub(super) fn sample(&self) -> Option<&Sample> {
        self.sample.as_ref()
    }

    pub(super) fn clear(&mut self) {
        self.sample = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn sample(x: f64, objective_value: f64, soft_constraints_value: f64) -> Sample {
        Sample::new(vec![x], objective_value, soft_constraints_value)
    }

    #[test]
    fn starts_empty() {
        assert!(Best::default().sample().is_none());
    }

    #[test]
    fn keeps_lowest_objective() {
        let mut best = Best::default();
        best.update(&sample(1.0, 3.0, 0.0));
        best.update(&sample(2.0, 1.0, 0.0));
        best.update(&sample(3.0, 2.0, 0.0));

        let best = best.sample().expect("best sample");
        assert_relative_eq!(best.parameter[0], 2.0);
        assert_relative_eq!(best.objective_value, 1.0);
    }

    #[test]
    fn soft_constraints_dominate() {
        let mut best = Best::default();
        best.update(&sample(1.0, -10.0, 1.0));
        best.update(&sample(2.0, 5.0, 0.5));
        best.update(&sample(3.0, -20.0, 0.75));

        let best = best.sample().expect("best sample");
        assert_relative_eq!(best.parameter[0], 2.0);
    }

    #[test]
    fn ties_keep_incumbent() {
        let mut best = Best::default();
        best.update(&sample(1.0, 1.0, 0.0));
        best.update(&sample(2.0, 1.0, 0.0));

        assert_relative_eq!(best.sample().expect("best sample").parameter[0], 1.0);
    }

    #[test]
    fn first_non_finite_sample_is_replaced_by_finite_one() {
        let mut best = Best::default();
        best.update(&sample(1.0, f64::NAN, 0.0));
        best.update(&sample(2.0, 7.0, 0.0));
        best.update(&sample(3.0, f64::NEG_INFINITY, 0.0));

        let best = best.sample().expect("best sample");
        assert_relative_eq!(best.parameter[0], 2.0);
        assert_relative_eq!(best.objective_value, 7.0);
    }

    #[test]
    fn clear_forgets_best() {
        let mut best = Best::default();
        best.update(&sample(1.0, 1.0, 0.0));
        best.clear();
        assert!(best.sample().is_none());
    }
}
