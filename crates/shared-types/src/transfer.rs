//! # Wire Sizes
//!
//! Everything that crosses the simulated network implements [`Transferable`].
//! Sizes follow the byte layout of a real deployment rather than the size of
//! the in-memory objects, so the bandwidth model charges realistic costs.

use serde::{Deserialize, Serialize};
use shared_crypto::{CredRequest, Credentials};

use crate::entities::{Endorsement, NonRevocationHandle, NonRevocationRequest, Transaction, TransactionProposal};

/// Size of an X.509 certificate the credentials stand in for.
pub const CERTIFICATE_SIZE: usize = 734;

/// Endorsement: Schnorr signature plus the endorser's certificate.
pub const ENDORSEMENT_SIZE: usize = 5 * 32 + CERTIFICATE_SIZE;

/// Non-revocation request: revocation key plus certificate.
pub const NON_REVOCATION_REQUEST_SIZE: usize = 1 + 2 * 32 + CERTIFICATE_SIZE;

/// Non-revocation handle: Groth signature.
pub const NON_REVOCATION_HANDLE_SIZE: usize = 3 * (1 + 2 * 32) + 4 * 32;

const AUDIT_SIZE: usize = 4 * 32 + 2 * 4 * 32;
const REVOCATION_PROOF_SIZE: usize = 3 * 32 + 3 * (1 + 2 * 32) + 4 * 32 + 4;

/// An object with a simulated wire size and a label for the network log.
pub trait Transferable: Send + Sync {
    /// Bytes on the wire.
    fn size(&self) -> usize;

    /// Label in the network event log.
    fn name(&self) -> &'static str;
}

/// An issuer nonce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nonce(pub Vec<u8>);

impl Transferable for Nonce {
    fn size(&self) -> usize {
        self.0.len()
    }

    fn name(&self) -> &'static str {
        "nonce"
    }
}

impl Transferable for CredRequest {
    fn size(&self) -> usize {
        self.to_bytes().len()
    }

    fn name(&self) -> &'static str {
        "cred-request"
    }
}

impl Transferable for Credentials {
    fn size(&self) -> usize {
        self.to_bytes().len()
    }

    fn name(&self) -> &'static str {
        "credentials"
    }
}

impl Transferable for TransactionProposal {
    fn size(&self) -> usize {
        // hash + chaincode + signature + proof + nym key + attribute (value + 2 ints)
        self.hash.len()
            + self.chaincode.len()
            + self.signature.to_bytes().len()
            + self.proof.len()
            + 4 * 32
            + 4 * 32
            + 2 * 4
    }

    fn name(&self) -> &'static str {
        "transaction-proposal"
    }
}

impl Transferable for Endorsement {
    fn size(&self) -> usize {
        ENDORSEMENT_SIZE
    }

    fn name(&self) -> &'static str {
        "endorsement"
    }
}

impl Transferable for Transaction {
    fn size(&self) -> usize {
        let audit = if self.audit.is_some() { AUDIT_SIZE } else { 0 };
        let revocation = if self.non_revocation.is_some() {
            REVOCATION_PROOF_SIZE
        } else {
            0
        };
        self.signature.to_bytes().len()
            + self.proposal.size()
            + audit
            + self.endorsements.len() * ENDORSEMENT_SIZE
            + revocation
    }

    fn name(&self) -> &'static str {
        "transaction"
    }
}

impl Transferable for NonRevocationRequest {
    fn size(&self) -> usize {
        NON_REVOCATION_REQUEST_SIZE
    }

    fn name(&self) -> &'static str {
        "non-revocation-request"
    }
}

impl Transferable for NonRevocationHandle {
    fn size(&self) -> usize {
        NON_REVOCATION_HANDLE_SIZE
    }

    fn name(&self) -> &'static str {
        "non-revocation-handle"
    }
}
