//! # Ports Layer
//!
//! - **Inbound (Driving)**: `RevocationApi`, called by users

pub mod inbound;
