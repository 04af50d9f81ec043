//! # Inbound Ports (Driving Ports / API)

use async_trait::async_trait;
use shared_crypto::PublicKey;
use shared_types::{NonRevocationHandle, NonRevocationRequest};

use crate::domain::errors::RevocationError;

/// What a user needs from the revocation authority.
#[async_trait]
pub trait RevocationApi: Send + Sync {
    /// Epoch the authority currently grants handles for.
    async fn current_epoch(&self) -> Result<u64, RevocationError>;

    /// Key handles are signed with.
    async fn public_key(&self) -> Result<PublicKey, RevocationError>;

    /// Obtain a handle for the current epoch.
    async fn request_handle(
        &self,
        request: NonRevocationRequest,
    ) -> Result<NonRevocationHandle, RevocationError>;
}
