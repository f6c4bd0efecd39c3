//! Data processing for epidemic forecast observations.
//!
//! This crate turns the typed records of `epi-core` into the aligned,
//! gap-filled series a chart renderer draws. Every function here is pure:
//! it reads the immutable base data plus a snapshot of the filter
//! parameters and returns a fresh result. "Nothing matched" is always an
//! empty or explicitly tagged result, never an error.

pub mod domain;
pub mod forecast;
pub mod gap_fill;
pub mod horizon;
pub mod nowcast;
pub mod scores;
pub mod span;
pub mod window;

#[cfg(test)]
pub(crate) mod fixtures;
