//! # Revocation Authority (DL-02)
//!
//! Issues time-bounded non-revocation handles and owns the run's epoch.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): handle signing, epoch counter
//! - **Ports Layer** (`ports/`): `RevocationApi`
//! - **Service Layer** (`service.rs`): limiter-bounded grants with bandwidth billing
//! - **Adapters** (`adapters/`): actor (in-process) and RPC bindings
//!
//! A handle is valid only for the epoch it was granted in. Users compare
//! their cached epoch with [`RevocationApi::current_epoch`] and refresh when
//! it moved.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::actor::{RevocationActor, RevocationActorHandle, RevocationMessage};
pub use adapters::rpc::{
    run_epoch_timer, RevocationRequest, RevocationResponse, RevocationRpcServer,
    RpcRevocationClient,
};
pub use domain::authority::{verify_handle, RevocationAuthority};
pub use domain::epoch::{EpochCounter, INITIAL_EPOCH};
pub use domain::errors::RevocationError;
pub use ports::inbound::RevocationApi;
pub use service::RevocationService;
