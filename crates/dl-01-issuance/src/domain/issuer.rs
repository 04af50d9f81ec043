//! # Issuer
//!
//! Root and organizations issue credentials one level below themselves: the
//! root to organizations (level 1), an organization to its users (level 2).
//! Each issued link carries the holder's name and the post-right marker.

use rand::{CryptoRng, RngCore};
use shared_crypto::{produce_attribute, Attribute, CredRequest, Credentials, NONCE_SIZE};
use shared_types::{org_name, user_name, Identity, Nonce, ProtocolViolation, RoleTag};

use super::errors::IssuanceError;

/// Attribute granting the right to post transactions.
pub const POST_RIGHT: &str = "has-right-to-post";

/// Position of the post-right attribute in a user's chain:
/// link 1 (the organization's delegation to the user), attribute 1.
pub const POST_RIGHT_INDEX: (usize, usize) = (1, 1);

/// Attributes delegated to `role` number `id`.
pub fn attributes_for(role: RoleTag, id: u64) -> Vec<Attribute> {
    let level = role.level();
    let name = match role {
        RoleTag::Root => shared_types::ROOT.to_string(),
        RoleTag::Organization => org_name(id),
        RoleTag::User => user_name(id),
    };
    vec![
        produce_attribute(level, &name),
        produce_attribute(level, POST_RIGHT),
    ]
}

/// An identity that can delegate credentials.
#[derive(Debug, Clone)]
pub struct Issuer {
    identity: Identity,
    child_role: RoleTag,
}

impl Issuer {
    /// Wrap `identity`; users cannot issue.
    pub fn new(identity: Identity) -> Result<Self, IssuanceError> {
        let child_role = match identity.role {
            RoleTag::Root => RoleTag::Organization,
            RoleTag::Organization => RoleTag::User,
            RoleTag::User => return Err(IssuanceError::NotAnIssuer(identity.name())),
        };
        Ok(Self {
            identity,
            child_role,
        })
    }

    /// The issuing identity.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Endpoint name of the issuer.
    pub fn name(&self) -> String {
        self.identity.name()
    }

    /// Role of the identities this issuer creates.
    pub fn child_role(&self) -> RoleTag {
        self.child_role
    }

    /// Endpoint name of child `id`.
    pub fn child_name(&self, id: u64) -> String {
        match self.child_role {
            RoleTag::Organization => org_name(id),
            _ => user_name(id),
        }
    }

    /// Fresh nonce for a credential request.
    pub fn nonce<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Nonce {
        let mut bytes = vec![0u8; NONCE_SIZE];
        rng.fill_bytes(&mut bytes);
        Nonce(bytes)
    }

    /// Validate `request` from child `id` and extend the issuer's chain to it.
    pub fn grant<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        id: u64,
        request: &CredRequest,
    ) -> Result<Credentials, ProtocolViolation> {
        let requester = self.child_name(id);
        request
            .validate()
            .map_err(|source| ProtocolViolation::InvalidCredRequest {
                requester: requester.clone(),
                source,
            })?;
        if request.level != self.child_role.level() {
            return Err(ProtocolViolation::InvalidCredRequest {
                requester,
                source: shared_crypto::CryptoError::InvalidCredentialRequest,
            });
        }

        let mut credentials = self.identity.credentials.clone();
        credentials
            .delegate(
                rng,
                &self.identity.keys.sk,
                request.pk,
                attributes_for(self.child_role, id),
            )
            .map_err(|source| ProtocolViolation::InvalidCredentials {
                holder: requester,
                source,
            })?;
        Ok(credentials)
    }
}
