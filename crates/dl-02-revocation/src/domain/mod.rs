//! # Domain Layer
//!
//! Handle issuance and the epoch counter. No I/O.

pub mod authority;
pub mod epoch;
pub mod errors;
