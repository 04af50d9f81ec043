//! # Core Domain Entities
//!
//! The objects that travel through the transaction life-cycle:
//!
//! - **Proposal**: `TransactionProposal`, built by a user, endorsed by peers
//! - **Endorsement**: a peer's Schnorr signature over the proposal
//! - **Transaction**: proposal + endorsements (+ audit / non-revocation proof)
//! - **Revocation**: `NonRevocationRequest`, `NonRevocationHandle`
//!
//! Reply channels are not part of these types; they live in the message
//! envelopes of whichever transport carries them.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use shared_crypto::{
    AuditingEncryption, AuditingProof, GrothSignature, Index, NymSignature, PublicKey,
    RevocationProof, SchnorrSignature,
};
use std::fmt;

/// Numeric ID of a peer.
pub type PeerId = u64;

/// Numeric ID of a user (`org * users_per_org + user`).
pub type UserId = u64;

/// Chaincode every proposal invokes.
pub const CHAINCODE: &str = "chaincode: hash | policy: write";

/// Kind of work a peer performs; partitions the identity-proof cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// Endorsing a proposal.
    Endorsement,
    /// Ordering a transaction.
    Ordering,
    /// Validating a transaction.
    Validation,
}

impl Operation {
    /// All operation kinds.
    pub const ALL: [Operation; 3] = [
        Operation::Endorsement,
        Operation::Ordering,
        Operation::Validation,
    ];

    /// Label used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Endorsement => "endorsement",
            Operation::Ordering => "ordering",
            Operation::Validation => "validation",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's request to have a message executed and recorded.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionProposal {
    /// SHA3-256 of the submitted message.
    #[serde_as(as = "Bytes")]
    pub hash: [u8; 32],
    /// Author, kept in the clear so the auditor can check the encryption.
    pub author_id: UserId,
    /// Invoked chaincode.
    pub chaincode: String,
    /// Serialized credential proof of the author.
    pub proof: Vec<u8>,
    /// One-time pseudonym key of the author.
    pub nym_pk: PublicKey,
    /// Disclosed attribute positions.
    pub indices: Vec<Index>,
    /// Pseudonym signature over [`TransactionProposal::canonical_bytes`].
    pub signature: NymSignature,
}

impl TransactionProposal {
    /// `hash ‖ chaincode ‖ author ID (low byte) ‖ proof`.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        canonical_bytes(&self.hash, &self.chaincode, self.author_id, &self.proof)
    }
}

/// Canonical proposal encoding, available before the proposal is signed.
pub fn canonical_bytes(hash: &[u8; 32], chaincode: &str, author_id: UserId, proof: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(hash.len() + chaincode.len() + 1 + proof.len());
    message.extend_from_slice(hash);
    message.extend_from_slice(chaincode.as_bytes());
    message.push(author_id as u8);
    message.extend_from_slice(proof);
    message
}

/// A peer's approval of a proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endorsement {
    /// Schnorr signature over the proposal's canonical bytes.
    pub signature: SchnorrSignature,
    /// Signing peer.
    pub endorser: PeerId,
}

/// Auditable encryption of the author's key and its proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditData {
    /// Encryption of the author's public key under the auditor key.
    pub encryption: AuditingEncryption,
    /// Consistency proof.
    pub proof: AuditingProof,
}

/// An endorsed proposal submitted for ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Fresh pseudonym signature over the proposal.
    pub signature: NymSignature,
    /// The endorsed proposal.
    pub proposal: TransactionProposal,
    /// Present when auditing is enabled.
    pub audit: Option<AuditData>,
    /// Collected endorsements.
    pub endorsements: Vec<Endorsement>,
    /// Present when revocation is enabled.
    pub non_revocation: Option<RevocationProof>,
    /// Epoch the non-revocation proof was made for.
    pub epoch: u64,
    /// Set once by the ordering peer.
    pub orderer: Option<PeerId>,
}

/// Request for a non-revocation handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonRevocationRequest {
    /// Requesting user.
    pub user_id: UserId,
    /// The user's revocation-domain public key.
    pub user_pk: PublicKey,
}

/// A non-revocation handle valid for exactly one epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonRevocationHandle {
    /// Authority signature over `(user_pk, epoch · G)`.
    pub handle: GrothSignature,
    /// Epoch the handle was issued for.
    pub epoch: u64,
}

/// A committed transaction as the auditor sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Claimed author.
    pub author_id: UserId,
    /// Encryption of the actual author key.
    pub encryption: AuditingEncryption,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_bytes_layout() {
        let hash = [7u8; 32];
        let bytes = canonical_bytes(&hash, CHAINCODE, 258, b"proof");

        assert_eq!(&bytes[..32], &hash);
        assert_eq!(&bytes[32..32 + CHAINCODE.len()], CHAINCODE.as_bytes());
        // only the low byte of the author ID is encoded
        assert_eq!(bytes[32 + CHAINCODE.len()], 2);
        assert!(bytes.ends_with(b"proof"));
    }

    #[test]
    fn test_operation_labels() {
        let labels: Vec<_> = Operation::ALL.iter().map(|op| op.to_string()).collect();
        assert_eq!(labels, vec!["endorsement", "ordering", "validation"]);
    }
}
