/// Actions an observer can take at an iteration boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop the optimizer and keep the best sample found so far.
    ///
    /// The optimizer state stays intact, so a later call to
    /// [`Optimizer::optimize`](super::Optimizer::optimize) resumes the run.
    StopEarly,
}
