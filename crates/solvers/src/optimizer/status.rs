/// Why an optimizer run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The best objective value reached the acceptable objective value.
    Finished,

    /// Reached the maximal number of iterations.
    MaxIterations,

    /// Reached the maximal number of evaluations.
    MaxEvaluations,

    /// Stopped early due to an observer decision.
    StoppedByObserver,
}
