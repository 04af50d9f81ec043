//! # Delegatable Credentials
//!
//! A credential is a chain of links anchored at the root key. Each link names
//! a holder key and a list of attributes and is signed by the previous
//! holder, so a holder at level `n` can delegate to level `n + 1`.
//!
//! ```text
//! root_pk ──sig──▶ [org_pk, {org-3, has-right-to-post}]
//!                     └──sig──▶ [user_pk, {user-31, has-right-to-post}]
//! ```
//!
//! Proving possession discloses the chain together with a proof binding the
//! chain tip to a one-time pseudonym. This construction is not anonymous: a
//! verifier learns the chain. The ledger core only relies on the contract
//! (prove, verify, bind to pseudonym), never on hiding.

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};

use crate::group::{sha3_256, GroupPoint};
use crate::keys::{KeyPair, NymKeys, PublicKey, PublicParams, SecretKey};
use crate::schnorr::{self, SchnorrSignature};
use crate::sigma::{Equation, SigmaProof};
use crate::CryptoError;

/// Size of the nonce an issuer hands out before a credential request.
pub const NONCE_SIZE: usize = 32;

/// A hashed attribute value.
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attribute(#[serde_as(as = "Bytes")] pub [u8; 32]);

/// Encode the attribute `value` for delegation level `level`.
pub fn produce_attribute(level: u8, value: &str) -> Attribute {
    let mut raw = Vec::with_capacity(value.len() + 1);
    raw.push(level);
    raw.extend_from_slice(value.as_bytes());
    Attribute(sha3_256(&raw))
}

fn encode<T: Serialize>(value: &T) -> Vec<u8> {
    // In-memory encoding of these types is infallible.
    bincode::serialize(value).unwrap_or_default()
}

fn decode<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Result<T, CryptoError> {
    bincode::deserialize(bytes).map_err(|e| CryptoError::Encoding(e.to_string()))
}

/// Request for a credential: the requester's key plus proof that it owns it,
/// bound to the issuer's nonce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredRequest {
    /// Key the credential will be issued to.
    pub pk: PublicKey,
    /// Issuer nonce the proof is bound to.
    pub nonce: Vec<u8>,
    /// Delegation level requested.
    pub level: u8,
    proof: SigmaProof,
}

impl CredRequest {
    fn context(nonce: &[u8], level: u8) -> Vec<u8> {
        let mut context = nonce.to_vec();
        context.push(level);
        context
    }

    /// Build a request for `keys` over the issuer `nonce`.
    pub fn new<R: RngCore + CryptoRng>(rng: &mut R, keys: &KeyPair, nonce: &[u8]) -> Self {
        let equations = [Equation::new(keys.pk, vec![GroupPoint::generator()])];
        let proof = SigmaProof::prove(
            rng,
            "cred-request",
            &Self::context(nonce, keys.level),
            &equations,
            &[keys.sk.0],
        );
        Self {
            pk: keys.pk,
            nonce: nonce.to_vec(),
            level: keys.level,
            proof,
        }
    }

    /// Check the proof of possession.
    pub fn validate(&self) -> Result<(), CryptoError> {
        let equations = [Equation::new(self.pk, vec![GroupPoint::generator()])];
        if self
            .proof
            .verify("cred-request", &Self::context(&self.nonce, self.level), &equations)
        {
            Ok(())
        } else {
            Err(CryptoError::InvalidCredentialRequest)
        }
    }

    /// Wire encoding.
    pub fn to_bytes(&self) -> Vec<u8> {
        encode(self)
    }
}

/// One delegation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialLink {
    /// Key the link delegates to.
    pub holder_pk: PublicKey,
    /// Attributes granted at this level.
    pub attributes: Vec<Attribute>,
    signature: SchnorrSignature,
}

fn link_message(position: usize, holder_pk: &PublicKey, attributes: &[Attribute]) -> Vec<u8> {
    let mut message = Vec::with_capacity(8 + 33 + attributes.len() * 32);
    message.extend_from_slice(&(position as u64).to_be_bytes());
    message.extend_from_slice(&holder_pk.to_bytes());
    for attribute in attributes {
        message.extend_from_slice(&attribute.0);
    }
    message
}

/// A credential chain anchored at a root key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Root key the chain starts from.
    pub root_pk: PublicKey,
    /// Delegation links, level 1 first.
    pub links: Vec<CredentialLink>,
}

impl Credentials {
    /// An empty chain owned by the root itself.
    pub fn new(root_pk: PublicKey) -> Self {
        Self {
            root_pk,
            links: Vec::new(),
        }
    }

    /// Key owning the tip of the chain.
    pub fn holder_pk(&self) -> PublicKey {
        self.links
            .last()
            .map_or(self.root_pk, |link| link.holder_pk)
    }

    /// Attribute at `(link, position)`.
    pub fn attribute(&self, link: usize, position: usize) -> Option<Attribute> {
        self.links
            .get(link)
            .and_then(|l| l.attributes.get(position))
            .copied()
    }

    /// Extend the chain to `holder_pk`. `issuer_sk` must own the current tip.
    pub fn delegate<R: RngCore + CryptoRng>(
        &mut self,
        rng: &mut R,
        issuer_sk: &SecretKey,
        holder_pk: PublicKey,
        attributes: Vec<Attribute>,
    ) -> Result<(), CryptoError> {
        if issuer_sk.public_key() != self.holder_pk() {
            return Err(CryptoError::NotChainHolder);
        }
        let message = link_message(self.links.len(), &holder_pk, &attributes);
        let signature = schnorr::sign(rng, issuer_sk, &message);
        self.links.push(CredentialLink {
            holder_pk,
            attributes,
            signature,
        });
        Ok(())
    }

    fn verify_chain(&self, root_pk: &PublicKey) -> Result<(), CryptoError> {
        if self.root_pk != *root_pk {
            return Err(CryptoError::RootKeyMismatch);
        }
        let mut issuer = self.root_pk;
        for (position, link) in self.links.iter().enumerate() {
            let message = link_message(position, &link.holder_pk, &link.attributes);
            schnorr::verify(&issuer, &link.signature, &message)
                .map_err(|_| CryptoError::BrokenCredentialLink { link: position })?;
            issuer = link.holder_pk;
        }
        Ok(())
    }

    /// Check every link against `root_pk` and that `holder_sk` owns the tip.
    pub fn verify(&self, holder_sk: &SecretKey, root_pk: &PublicKey) -> Result<(), CryptoError> {
        self.verify_chain(root_pk)?;
        if holder_sk.public_key() != self.holder_pk() {
            return Err(CryptoError::HolderMismatch);
        }
        Ok(())
    }

    /// Prove possession of the chain under pseudonym `nym`, disclosing
    /// the attributes at `indices`.
    pub fn prove<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        sk: &SecretKey,
        nym: &NymKeys,
        indices: &[Index],
        params: &PublicParams,
    ) -> Result<CredentialProof, CryptoError> {
        if sk.public_key() != self.holder_pk() {
            return Err(CryptoError::HolderMismatch);
        }
        check_indices(self, indices)?;

        let equations = binding_equations(self.holder_pk(), nym.pk, params);
        let binding = SigmaProof::prove(
            rng,
            "cred-proof",
            &proof_context(indices),
            &equations,
            &[sk.0, nym.sk.0],
        );
        Ok(CredentialProof {
            credentials: self.clone(),
            binding,
        })
    }

    /// Wire encoding.
    pub fn to_bytes(&self) -> Vec<u8> {
        encode(self)
    }

    /// Decode the wire encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        decode(bytes)
    }
}

/// A disclosed attribute position: link `link`, attribute `position`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    /// Link index (0 = first delegation).
    pub link: usize,
    /// Position within the link's attributes.
    pub position: usize,
    /// Claimed attribute value.
    pub attribute: Attribute,
}

fn check_indices(credentials: &Credentials, indices: &[Index]) -> Result<(), CryptoError> {
    for index in indices {
        let actual = credentials
            .attribute(index.link, index.position)
            .ok_or(CryptoError::IndexOutOfRange {
                link: index.link,
                position: index.position,
            })?;
        if actual != index.attribute {
            return Err(CryptoError::AttributeMismatch {
                link: index.link,
                position: index.position,
            });
        }
    }
    Ok(())
}

fn proof_context(indices: &[Index]) -> Vec<u8> {
    let mut transcript = Vec::with_capacity(indices.len() * 48);
    for index in indices {
        transcript.extend_from_slice(&(index.link as u64).to_be_bytes());
        transcript.extend_from_slice(&(index.position as u64).to_be_bytes());
        transcript.extend_from_slice(&index.attribute.0);
    }
    transcript
}

fn binding_equations(holder_pk: PublicKey, nym_pk: PublicKey, params: &PublicParams) -> Vec<Equation> {
    vec![
        Equation::new(holder_pk, vec![GroupPoint::generator(), GroupPoint::identity()]),
        Equation::new(nym_pk, vec![GroupPoint::generator(), params.h]),
    ]
}

/// Proof that the holder of a valid chain controls a pseudonym.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialProof {
    credentials: Credentials,
    binding: SigmaProof,
}

impl CredentialProof {
    /// Verify against the root key, the pseudonym and the disclosed indices.
    pub fn verify(
        &self,
        params: &PublicParams,
        nym_pk: &PublicKey,
        indices: &[Index],
    ) -> Result<(), CryptoError> {
        self.credentials.verify_chain(&params.root_pk)?;
        check_indices(&self.credentials, indices)?;

        let equations = binding_equations(self.credentials.holder_pk(), *nym_pk, params);
        if self
            .binding
            .verify("cred-proof", &proof_context(indices), &equations)
        {
            Ok(())
        } else {
            Err(CryptoError::InvalidCredentialProof)
        }
    }

    /// Wire encoding.
    pub fn to_bytes(&self) -> Vec<u8> {
        encode(self)
    }

    /// Decode the wire encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        decode(bytes)
    }
}
