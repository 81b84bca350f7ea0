//! Cached, counted evaluation of an objective.
//!
//! Every strategy routes its candidates through an [`Evaluator`]. The
//! evaluator owns the only cache for its objective and keeps two counters that
//! termination logic depends on:
//!
//! - the number of evaluations, incremented on every call
//! - the number of distinct evaluations, incremented only when a new cache
//!   entry is inserted (or on every call with caching off)
//!
//! With caching enabled, a parameter that is bit-identical to an earlier one
//! is answered from the cache. With caching disabled, every call computes the
//! objective and the two counters stay equal. In every state, the number of
//! distinct evaluations never exceeds the number of evaluations.
//!
//! The cache matches parameters exactly (see [`Fingerprint`]). Continuous
//! samplers rarely repeat a parameter bit for bit, so most cache hits come from
//! replayed or grid-like queries.
//!
//! [`Fingerprint`]: skein_core::Fingerprint

mod evaluator;
mod policy;

#[cfg(test)]
mod tests;

pub use evaluator::Evaluator;
pub use policy::Policy;
