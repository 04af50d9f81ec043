//! # Error Types
//!
//! Defines error types shared across the protocol roles.

use shared_crypto::CryptoError;
use thiserror::Error;
use tracing::error;

use crate::entities::{Operation, PeerId};

/// A broken protocol invariant.
///
/// The simulation assumes honest participants, so every variant signals a
/// setup bug. Actors turn them into [`abort`] at their boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    /// Credential request proof of possession failed.
    #[error("credential request of {requester} is invalid: {source}")]
    InvalidCredRequest { requester: String, source: CryptoError },

    /// Freshly issued credentials did not verify.
    #[error("credentials of {holder} do not verify: {source}")]
    InvalidCredentials { holder: String, source: CryptoError },

    /// Proposal or transaction pseudonym signature failed.
    #[error("nym signature verification failed during {operation}")]
    InvalidNymSignature { operation: Operation },

    /// Identity proof did not verify.
    #[error("identity proof rejected during {operation}: {source}")]
    InvalidIdentityProof { operation: Operation, source: CryptoError },

    /// Fewer endorsements than the configured threshold.
    #[error("too few endorsements: got {got}, need {need}")]
    TooFewEndorsements { got: usize, need: usize },

    /// Endorsement claims an unknown peer.
    #[error("endorsement from unknown peer {0}")]
    UnknownEndorser(PeerId),

    /// Endorsement signature failed.
    #[error("endorsement of peer {endorser} does not verify")]
    InvalidEndorsement { endorser: PeerId },

    /// Audit proof failed or audit data missing.
    #[error("audit proof rejected: {0}")]
    InvalidAuditProof(String),

    /// Non-revocation proof failed or missing.
    #[error("non-revocation proof rejected: {0}")]
    InvalidNonRevocation(String),

    /// Non-revocation handle from the authority did not verify.
    #[error("non-revocation handle for epoch {epoch} does not verify")]
    InvalidNonRevocationHandle { epoch: u64 },

    /// Transaction was ordered twice.
    #[error("transaction already ordered by peer {0}")]
    AlreadyOrdered(PeerId),

    /// Decrypted audit key does not match the claimed author.
    #[error("audit mismatch for user {author_id}")]
    AuditMismatch { author_id: u64 },

    /// An actor or channel needed by the protocol is gone.
    #[error("{0} is unreachable")]
    Unreachable(String),
}

/// Configuration rejected before the simulation starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A field that must be positive is zero.
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Log `violation` and terminate the process.
///
/// Protocol violations are not recoverable; the whole run is invalid.
pub fn abort(context: &str, violation: ProtocolViolation) -> ! {
    error!(%violation, "[{}] protocol violation, aborting", context);
    std::process::exit(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_messages_name_the_step() {
        let violation = ProtocolViolation::TooFewEndorsements { got: 1, need: 2 };
        assert_eq!(violation.to_string(), "too few endorsements: got 1, need 2");

        let violation = ProtocolViolation::InvalidIdentityProof {
            operation: Operation::Ordering,
            source: CryptoError::InvalidCredentialProof,
        };
        assert!(violation.to_string().contains("ordering"));
    }
}
