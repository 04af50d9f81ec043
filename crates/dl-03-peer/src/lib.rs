//! # Peer (DL-03)
//!
//! Endorses proposals, orders transactions and validates them.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): proof cache and verification steps, no I/O
//! - **Ports Layer** (`ports/`): `PeerApi`
//! - **Service Layer** (`service.rs`): `PeerCore`, the protocol itself
//! - **Directory** (`directory.rs`): every peer's key and binding
//! - **Adapters** (`adapters/`): actor and RPC bindings over the same core
//!
//! ## Request Flow
//!
//! ```text
//! user ── proposal ──▶ endorser(s) ── endorsement ──▶ user
//! user ── transaction ──▶ orderer ── broadcast ──▶ every peer ── commit ──▶ user
//! ```
//!
//! Endorsement and validation are bounded by their own limiters; ordering
//! spawns one task per request. Identity proofs are verified once per
//! operation kind and cached.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod directory;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::actor::{peer_channel, PeerActor, PeerHandle, PeerMailbox};
pub use adapters::rpc::{PeerRequest, PeerResponse, PeerRpcServer, RpcPeerClient};
pub use directory::{peer_keys, PeerDirectory, PeerEntry};
pub use domain::cache::{proof_key, ProofCache, ProofKey};
pub use domain::checks::TrustAnchors;
pub use domain::errors::PeerError;
pub use ports::inbound::PeerApi;
pub use service::PeerCore;
