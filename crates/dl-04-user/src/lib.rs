//! # User (DL-04)
//!
//! Drives transactions through the network on behalf of one enrolled user.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): routing, assembly, arrival schedule
//! - **Ports Layer** (`ports/`): `CommitLedger`
//! - **Service Layer** (`service.rs`): `UserAgent`, the transaction life-cycle
//!
//! ## Transaction Flow
//!
//! ```text
//! hash ─▶ endorsers ─▶ proposal ─▶ endorsements ─▶ (handle refresh)
//!      ─▶ transaction ─▶ orderer ─▶ commit from every peer ─▶ ledger
//! ```
//!
//! Peers are reached only through `PeerApi`, so the same agent runs
//! against in-process actors and remote peers.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod ports;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use domain::arrivals::{random_message, ArrivalSchedule, MESSAGE_LENGTH};
pub use domain::assembly::{assemble_transaction, build_proposal, post_right_index, Attachments};
pub use domain::errors::UserError;
pub use domain::routing::{endorsers, orderer, peer_by_hash, ORDER_SUFFIX};
pub use ports::outbound::CommitLedger;
pub use service::{wait_for_commits, UserAgent, UserContext};
