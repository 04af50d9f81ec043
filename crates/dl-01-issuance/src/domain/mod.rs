//! # Domain Layer
//!
//! Credential issuance rules with no I/O dependencies.

pub mod errors;
pub mod issuer;
