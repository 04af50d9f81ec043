//! # Issuance Errors

use shared_bus::RpcError;
use shared_types::ProtocolViolation;
use thiserror::Error;

/// Errors from credential issuance.
#[derive(Debug, Error)]
pub enum IssuanceError {
    /// The protocol was violated; fatal for the run.
    #[error(transparent)]
    Violation(#[from] ProtocolViolation),

    /// Transport to a remote issuer failed.
    #[error("issuer unreachable: {0}")]
    Transport(#[from] RpcError),

    /// A remote issuer refused the request.
    #[error("issuer rejected request: {0}")]
    Rejected(String),

    /// The identity cannot issue credentials.
    #[error("{0} cannot issue credentials")]
    NotAnIssuer(String),
}
