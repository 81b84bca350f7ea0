use std::collections::{HashMap, hash_map::Entry};

use parking_lot::Mutex;
use skein_core::{Fingerprint, Objective, Sample};
use tracing::debug;

use super::Policy;

/// Wraps an [`Objective`] with caching, evaluation counters, and an optional
/// sampling history.
///
/// Evaluation takes `&self`, so one evaluator can serve a whole population
/// from several threads. The cache, counters, and history share one lock;
/// the objective itself is called outside of it. When two threads race on the
/// same parameter that is not yet cached, both compute it but only the first
/// insertion counts as a distinct evaluation. The second thread returns the
/// cached sample.
#[derive(Debug)]
pub struct Evaluator {
    objective: Objective,
    policy: Policy,
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    cache: HashMap<Fingerprint, Sample>,
    history: Vec<Sample>,
    evaluations: usize,
    distinct_evaluations: usize,
}

impl State {
    fn record(&mut self, policy: Policy, sample: &Sample) {
        if policy.is_recording() {
            self.history.push(sample.clone());
        }
    }
}

impl Evaluator {
    /// Creates an evaluator with an empty cache and zeroed counters.
    #[must_use]
    pub fn new(objective: Objective, policy: Policy) -> Self {
        Self {
            objective,
            policy,
            state: Mutex::new(State::default()),
        }
    }

    /// Evaluates `parameter` and returns its objective value.
    ///
    /// See [`Evaluator::sample`] for how the cache and counters are used.
    pub fn evaluate(&self, parameter: &[f64]) -> f64 {
        self.sample(parameter).objective_value
    }

    /// Evaluates `parameter` and returns the full sample.
    ///
    /// The number of evaluations always increases by one. If caching is
    /// enabled and a bit-identical parameter was evaluated before, the cached
    /// sample is returned. Otherwise the objective and soft constraints are
    /// computed, and the number of distinct evaluations increases by one if
    /// this call inserts the cache entry.
    pub fn sample(&self, parameter: &[f64]) -> Sample {
        debug_assert_eq!(
            parameter.len(),
            self.objective.dimension(),
            "parameter length must match the objective dimension"
        );

        if !self.policy.is_caching() {
            let sample = self.compute(parameter);
            let mut state = self.state.lock();
            state.evaluations += 1;
            state.distinct_evaluations += 1;
            state.record(self.policy, &sample);
            return sample;
        }

        let key = Fingerprint::new(parameter);
        {
            let mut state = self.state.lock();
            state.evaluations += 1;
            if let Some(sample) = state.cache.get(&key).cloned() {
                state.record(self.policy, &sample);
                return sample;
            }
        }

        let computed = self.compute(parameter);

        let mut guard = self.state.lock();
        let state = &mut *guard;
        let sample = match state.cache.entry(key) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                state.distinct_evaluations += 1;
                entry.insert(computed).clone()
            }
        };
        state.record(self.policy, &sample);
        sample
    }

    /// Clears the cache and the sampling history and zeroes both counters.
    pub fn reset(&mut self) {
        *self.state.get_mut() = State::default();
    }

    /// Returns the wrapped objective.
    #[must_use]
    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    #[must_use]
    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// Returns a copy of every cached sample, in no particular order.
    #[must_use]
    pub fn cached_samples(&self) -> Vec<Sample> {
        self.state.lock().cache.values().cloned().collect()
    }

    /// Returns true if a bit-identical `parameter` is cached.
    #[must_use]
    pub fn is_cached(&self, parameter: &[f64]) -> bool {
        self.state
            .lock()
            .cache
            .contains_key(&Fingerprint::new(parameter))
    }

    /// Returns a copy of the sampling history, in evaluation order.
    ///
    /// The history is empty unless the policy enables recording.
    #[must_use]
    pub fn sampling_history(&self) -> Vec<Sample> {
        self.state.lock().history.clone()
    }

    /// Returns the number of evaluations since construction or the last reset.
    #[must_use]
    pub fn number_of_evaluations(&self) -> usize {
        self.state.lock().evaluations
    }

    /// Returns the number of evaluations that inserted a new cache entry, or
    /// of every evaluation with caching off.
    ///
    /// Two threads racing on the same new parameter may both compute the
    /// objective, but only the one that inserts is counted.
    #[must_use]
    pub fn number_of_distinct_evaluations(&self) -> usize {
        self.state.lock().distinct_evaluations
    }

    fn compute(&self, parameter: &[f64]) -> Sample {
        let objective_value = self.objective.value(parameter);
        let soft_constraints_value = self.objective.soft_constraints_value(parameter);

        if !objective_value.is_finite() || !soft_constraints_value.is_finite() {
            debug!(
                objective_value,
                soft_constraints_value, "objective returned a non-finite value"
            );
        }

        Sample::new(parameter.to_vec(), objective_value, soft_constraints_value)
    }
}
