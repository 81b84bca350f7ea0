use std::hash::{Hash, Hasher};

/// An exact-equality cache key for a parameter vector.
///
/// A fingerprint owns an immutable copy of the parameter. Two fingerprints are
/// equal only if their parameters are bit-identical element by element, so
/// `0.0` and `-0.0` are different keys and a NaN matches only the same NaN
/// bit pattern. There is no tolerance: nearby parameters never share a key.
///
/// The hash feeds every element's bit pattern in order, so permuted vectors
/// hash differently.
#[derive(Debug, Clone)]
pub struct Fingerprint(Box<[f64]>);

impl Fingerprint {
    /// Creates a fingerprint from a copy of `parameter`.
    #[must_use]
    pub fn new(parameter: &[f64]) -> Self {
        Self(parameter.into())
    }

    /// Returns the fingerprinted parameter.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl PartialEq for Fingerprint {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len()
            && self
                .0
                .iter()
                .zip(other.0.iter())
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

impl Eq for Fingerprint {}

impl Hash for Fingerprint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.0.len());
        for value in &self.0 {
            state.write_u64(value.to_bits());
        }
    }
}

impl From<&[f64]> for Fingerprint {
    fn from(parameter: &[f64]) -> Self {
        Self::new(parameter)
    }
}
