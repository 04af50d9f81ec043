//! # Ports Layer
//!
//! - **Inbound (Driving)**: `IssuerApi`, called by enrolling identities

pub mod inbound;
