//! # Inbound Ports (Driving Ports / API)
//!
//! The two-step enrollment surface of an issuer. Implemented in-process by
//! [`crate::IssuerService`] and remotely by [`crate::adapters::rpc::RpcIssuerClient`].

use async_trait::async_trait;
use shared_crypto::{CredRequest, Credentials};
use shared_types::Nonce;

use crate::domain::errors::IssuanceError;

/// Credential issuer API.
#[async_trait]
pub trait IssuerApi: Send + Sync {
    /// Hand out a nonce to child `requester`.
    async fn get_nonce(&self, requester: u64) -> Result<Nonce, IssuanceError>;

    /// Validate `request` from child `requester` and return its credentials.
    async fn process_cred_request(
        &self,
        requester: u64,
        request: CredRequest,
    ) -> Result<Credentials, IssuanceError>;
}
