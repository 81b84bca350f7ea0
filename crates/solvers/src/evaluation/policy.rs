use serde::{Deserialize, Serialize};

/// Controls what an [`Evaluator`](super::Evaluator) keeps besides its counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    caching: bool,
    recording: bool,
}

impl Default for Policy {
    /// Caching enabled, sampling history disabled.
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl Policy {
    /// Creates a policy.
    ///
    /// - `caching`: answer repeated parameters from the cache
    /// - `recording`: append every evaluation to the sampling history
    #[must_use]
    pub const fn new(caching: bool, recording: bool) -> Self {
        Self { caching, recording }
    }

    /// Returns a copy with caching switched on or off.
    #[must_use]
    pub const fn with_caching(self, caching: bool) -> Self {
        Self { caching, ..self }
    }

    /// Returns a copy with sampling-history recording switched on or off.
    #[must_use]
    pub const fn with_recording(self, recording: bool) -> Self {
        Self { recording, ..self }
    }

    #[must_use]
    pub const fn is_caching(&self) -> bool {
        self.caching
    }

    #[must_use]
    pub const fn is_recording(&self) -> bool {
        self.recording
    }
}
