//! # Adapters Module
//!
//! Infrastructure adapters implementing the ports.
//!
//! - `actor`: in-process mailbox binding
//! - `rpc`: distributed binding

pub mod actor;
pub mod rpc;
