//! # Ports Layer
//!
//! - **Inbound (Driving)**: `PeerApi`, called by users and by ordering peers

pub mod inbound;
