use super::ConfigError;

/// Errors that can occur when constructing or restoring a CMA-ES strategy.
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),

    #[error("expected {expected} parameters, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
}
