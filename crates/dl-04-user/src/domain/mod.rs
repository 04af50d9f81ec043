//! # Domain Layer
//!
//! Routing, proposal and transaction assembly, and the arrival schedule.
//! No I/O.

pub mod arrivals;
pub mod assembly;
pub mod errors;
pub mod routing;
