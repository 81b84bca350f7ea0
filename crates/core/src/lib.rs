//! Core traits and types for the Skein optimization framework.
//!
//! This crate defines the shared abstractions that strategies, runners, and
//! observers build on:
//!
//! - [`Objective`]: the function being minimized, with optional soft
//!   constraints and bounds
//! - [`Sample`]: an evaluated parameter with its objective and soft-constraint
//!   values, plus the ranking rule every algorithm uses
//! - [`Fingerprint`]: the exact-equality cache key for a parameter vector
//! - [`Observer`]: receives solver events and optionally returns control actions

mod fingerprint;
mod objective;
mod observer;
mod sample;

pub use fingerprint::Fingerprint;
pub use objective::{Objective, ObjectiveError};
pub use observer::Observer;
pub use sample::{Sample, rank};
