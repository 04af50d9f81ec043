//! # Revocation Errors

use shared_bus::RpcError;
use thiserror::Error;

/// Errors reaching the revocation authority.
#[derive(Debug, Error)]
pub enum RevocationError {
    /// The authority actor has exited.
    #[error("revocation authority stopped")]
    Stopped,

    /// Transport to a remote authority failed.
    #[error("revocation authority unreachable: {0}")]
    Transport(#[from] RpcError),
}
