//! # Adapters Module
//!
//! Infrastructure adapters implementing the ports.
//!
//! - `actor`: three mailboxes per peer, in-process
//! - `rpc`: one server per peer, distributed

pub mod actor;
pub mod rpc;
