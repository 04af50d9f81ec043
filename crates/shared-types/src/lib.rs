//! # Shared Types Crate
//!
//! Data model shared by every protocol role: identities, proposals,
//! endorsements, transactions, non-revocation messages, their wire sizes,
//! the run configuration and the protocol-violation taxonomy.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type that crosses a role boundary is
//!   defined here, for both the in-process and the RPC transport.
//! - **No Reply Channels in Data**: reply paths belong to transport
//!   envelopes, so the same types serialize over RPC unchanged.
//! - **Fatal Violations**: `ProtocolViolation` is propagated with `?` inside
//!   a role and turned into [`abort`] at the actor boundary only.

pub mod config;
pub mod entities;
pub mod errors;
pub mod identity;
pub mod transfer;

pub use config::{SimulationConfig, MIB};
pub use entities::*;
pub use errors::*;
pub use identity::*;
pub use transfer::*;
