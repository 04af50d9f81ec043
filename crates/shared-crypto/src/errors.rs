//! Crypto error types.

use thiserror::Error;

/// Credential primitive errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// Bytes do not decode to a curve point
    #[error("Invalid group element encoding")]
    InvalidPoint,

    /// Bytes do not decode to a canonical scalar
    #[error("Invalid scalar encoding")]
    InvalidScalar,

    /// Schnorr signature verification failed
    #[error("Schnorr signature verification failed")]
    SignatureVerificationFailed,

    /// Pseudonym signature verification failed
    #[error("Nym signature verification failed")]
    NymSignatureVerificationFailed,

    /// Credential request proof of possession is invalid
    #[error("Credential request is invalid")]
    InvalidCredentialRequest,

    /// The delegating key does not own the tip of the credential chain
    #[error("Delegating key does not own the credential chain")]
    NotChainHolder,

    /// A link of the credential chain has a bad signature
    #[error("Credential link {link} does not verify")]
    BrokenCredentialLink {
        /// Position of the failing link in the chain
        link: usize,
    },

    /// Credential chain is anchored at a different root key
    #[error("Credential chain is anchored at a different root key")]
    RootKeyMismatch,

    /// The holder secret does not match the tip of the chain
    #[error("Credential chain does not belong to the holder")]
    HolderMismatch,

    /// A disclosed attribute index points outside the chain
    #[error("Attribute index ({link}, {position}) is out of range")]
    IndexOutOfRange {
        /// Link index
        link: usize,
        /// Attribute position within the link
        position: usize,
    },

    /// A disclosed attribute differs from the chain's attribute
    #[error("Disclosed attribute at ({link}, {position}) does not match")]
    AttributeMismatch {
        /// Link index
        link: usize,
        /// Attribute position within the link
        position: usize,
    },

    /// Proof of credential possession is invalid
    #[error("Credential proof is invalid")]
    InvalidCredentialProof,

    /// Non-revocation handle does not verify
    #[error("Non-revocation signature verification failed")]
    InvalidNonRevocationHandle,

    /// Non-revocation proof does not verify
    #[error("Non-revocation proof is invalid: {0}")]
    InvalidRevocationProof(&'static str),

    /// Auditing proof does not verify
    #[error("Auditing proof is invalid")]
    InvalidAuditingProof,

    /// Object (de)serialization failed
    #[error("Encoding failed: {0}")]
    Encoding(String),
}
