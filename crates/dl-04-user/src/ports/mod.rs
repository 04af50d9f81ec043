//! # Ports Layer
//!
//! - **Outbound (Driven)**: `CommitLedger`, where committed transactions go

pub mod outbound;
