use skein_core::Sample;

/// The algorithm-specific half of an optimizer.
///
/// A strategy proposes candidates and learns from their samples. The
/// [`Optimizer`](super::Optimizer) owns everything the strategies share:
/// evaluation, caching, best-sample tracking, and termination.
///
/// Each iteration calls [`propose`](Strategy::propose) once, evaluates every
/// proposed candidate, then calls [`update`](Strategy::update) once with all
/// of the resulting samples. Before proposing, the optimizer asks
/// [`is_stagnating`](Strategy::is_stagnating) and calls
/// [`restart`](Strategy::restart) if the search has stalled.
pub trait Strategy {
    /// Returns the number of parameters the strategy searches over.
    fn dimension(&self) -> usize;

    /// Proposes the next batch of candidate parameters.
    fn propose(&mut self) -> Vec<Vec<f64>>;

    /// Receives the samples for the most recent proposal.
    ///
    /// `samples[k]` belongs to the `k`-th proposed candidate. This is only
    /// called after every candidate of the proposal has been evaluated.
    fn update(&mut self, samples: &[Sample]);

    /// Restores the strategy to its construction-time state.
    fn reset(&mut self);

    /// Returns true if the strategy can no longer make progress from its
    /// current state.
    fn is_stagnating(&self) -> bool {
        false
    }

    /// Re-initializes the search after stagnation.
    ///
    /// Defaults to [`reset`](Strategy::reset).
    fn restart(&mut self) {
        self.reset();
    }
}
