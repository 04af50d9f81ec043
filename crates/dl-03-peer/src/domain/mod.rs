//! # Domain Layer
//!
//! Proof cache and the verification steps peers run. No I/O.

pub mod cache;
pub mod checks;
pub mod errors;

#[cfg(test)]
pub(crate) mod fixtures;
