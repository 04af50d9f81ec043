//! # Adapters Module
//!
//! Infrastructure adapters implementing the ports.

pub mod rpc;
