//! # Credential Issuance (DL-01)
//!
//! Builds the identity hierarchy: the root delegates credentials to
//! organizations, organizations delegate to their users. Every chain must
//! verify against the root public key.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): issuance rules and attributes, no I/O
//! - **Ports Layer** (`ports/`): the `IssuerApi` enrollment surface
//! - **Service Layer** (`service.rs`): in-process issuer and the client-side `enroll`
//! - **Adapters** (`adapters/`): RPC server and client
//!
//! ## Protocol
//!
//! ```text
//! holder                         issuer
//!   │ ── GetNonce(id) ───────────▶ │
//!   │ ◀──────────────── nonce ──── │
//!   │ ── CredRequest(pk, nonce) ─▶ │  validate, delegate {name, has-right-to-post}
//!   │ ◀────────── credentials ──── │
//!   │ verify chain against root_pk
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::rpc::{IssuerRequest, IssuerResponse, IssuerRpcServer, RpcIssuerClient};
pub use domain::errors::IssuanceError;
pub use domain::issuer::{attributes_for, Issuer, POST_RIGHT, POST_RIGHT_INDEX};
pub use ports::inbound::IssuerApi;
pub use service::{enroll, IssuerService};
