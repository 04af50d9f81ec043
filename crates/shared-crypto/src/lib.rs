//! # Shared Crypto - Credential Primitives
//!
//! Delegatable credentials and the signatures, proofs and encryptions the
//! ledger protocol is built from. Everything is expressed over secp256k1
//! (`k256`) with SHA3-256 Fiat-Shamir transcripts.
//!
//! ## Components
//!
//! | Module | Primitive | Used by |
//! |--------|-----------|---------|
//! | `keys` | Keypairs, pseudonym keys, public parameters | everyone |
//! | `schnorr` | Schnorr signatures | peers (endorsements), issuers |
//! | `credentials` | Credential requests, delegation chains, proofs | issuers, users, peers |
//! | `nym` | Pseudonym signatures | users, peers |
//! | `revocation` | Epoch-bound non-revocation handles and proofs | revocation authority, users, peers |
//! | `auditing` | Auditable ElGamal encryption and its proof | users, peers, auditor |
//!
//! ## Limitations
//!
//! Credential proofs disclose the delegation chain, so this implementation
//! is not anonymous. The protocol only depends on the verification contract.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod auditing;
pub mod credentials;
pub mod errors;
pub mod group;
pub mod keys;
pub mod nym;
pub mod revocation;
pub mod schnorr;
mod sigma;

// Re-exports
pub use auditing::{auditing_encrypt, AuditingEncryption, AuditingProof, AuditingRandomness};
pub use credentials::{
    produce_attribute, Attribute, CredRequest, CredentialProof, Credentials, Index, NONCE_SIZE,
};
pub use errors::CryptoError;
pub use group::{sha3_256, GroupPoint, GroupScalar};
pub use keys::{generate_keys, generate_nym_keys, KeyPair, NymKeys, PublicKey, PublicParams, SecretKey};
pub use nym::{sign_nym, NymSignature};
pub use revocation::{epoch_generator, sign_non_revoke, GrothSignature, RevocationProof};
pub use schnorr::SchnorrSignature;
pub use sigma::SigmaProof;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
