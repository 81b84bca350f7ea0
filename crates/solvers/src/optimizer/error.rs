/// Errors that can occur when assembling an optimizer.
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("strategy has dimension {found}, but the objective has dimension {expected}")]
    DimensionMismatch { expected: usize, found: usize },
}
