use skein_core::Sample;

/// Event emitted by the optimizer once per iteration.
///
/// The event is emitted at the iteration boundary, after the strategy has
/// been updated. This is the only point where a run can be interrupted.
#[derive(Debug)]
pub struct Event<'a, S> {
    /// Number of completed iterations, starting at 1 for the first event.
    pub iteration: usize,

    /// Total number of evaluations so far.
    pub number_of_evaluations: usize,

    /// Number of evaluations that inserted a new cache entry, or every
    /// evaluation with caching off.
    pub number_of_distinct_evaluations: usize,

    /// The samples evaluated in this iteration, in proposal order.
    pub population: &'a [Sample],

    /// The best sample found so far.
    pub best: Option<&'a Sample>,

    /// The strategy after its update, for strategy-specific inspection.
    pub strategy: &'a S,
}

impl<S> Event<'_, S> {
    /// Returns the best objective value so far, or infinity if nothing has
    /// been evaluated.
    #[must_use]
    pub fn best_objective_value(&self) -> f64 {
        self.best.map_or(f64::INFINITY, |best| best.objective_value)
    }
}
