//! # Identities
//!
//! Participants of a run and the endpoint names they use on the simulated
//! network. An identity is a keypair plus a credential chain anchored at the
//! root key; it is created once and never mutated.

use serde::{Deserialize, Serialize};
use shared_crypto::{Credentials, KeyPair, PublicKey};
use std::fmt;

/// Endpoint name of the root authority.
pub const ROOT: &str = "root";

/// Endpoint name of the revocation authority.
pub const REVOCATION_AUTHORITY: &str = "revocation-authority";

/// Endpoint name of the auditor.
pub const AUDITOR: &str = "auditor";

/// Endpoint name of organization `id`.
pub fn org_name(id: u64) -> String {
    format!("org-{id}")
}

/// Endpoint name of user `id`.
pub fn user_name(id: u64) -> String {
    format!("user-{id}")
}

/// Endpoint name of peer `id`.
pub fn peer_name(id: u64) -> String {
    format!("peer-{id}")
}

/// Position of an identity in the delegation hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleTag {
    /// Self-issued root of trust.
    Root,
    /// Delegated by the root.
    Organization,
    /// Delegated by an organization.
    User,
}

impl RoleTag {
    /// Delegation level (0 = root).
    pub fn level(self) -> u8 {
        match self {
            RoleTag::Root => 0,
            RoleTag::Organization => 1,
            RoleTag::User => 2,
        }
    }

    /// Short label used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            RoleTag::Root => "root",
            RoleTag::Organization => "org",
            RoleTag::User => "user",
        }
    }
}

impl fmt::Display for RoleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keys, credentials, numeric ID and role of one participant.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Long-term keypair.
    pub keys: KeyPair,
    /// Credential chain ending at `keys.pk`.
    pub credentials: Credentials,
    /// Numeric ID, unique within the role.
    pub id: u64,
    /// Role in the hierarchy.
    pub role: RoleTag,
}

impl Identity {
    /// The self-issued root identity: an empty chain anchored at its own key.
    pub fn root(keys: KeyPair) -> Self {
        Self {
            credentials: Credentials::new(keys.pk),
            keys,
            id: 0,
            role: RoleTag::Root,
        }
    }

    /// Public key of the holder.
    pub fn public_key(&self) -> PublicKey {
        self.keys.pk
    }

    /// Endpoint name on the simulated network.
    pub fn name(&self) -> String {
        match self.role {
            RoleTag::Root => ROOT.to_string(),
            RoleTag::Organization => org_name(self.id),
            RoleTag::User => user_name(self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_names() {
        assert_eq!(org_name(3), "org-3");
        assert_eq!(user_name(12), "user-12");
        assert_eq!(peer_name(0), "peer-0");
    }

    #[test]
    fn test_root_identity_owns_empty_chain() {
        let keys = KeyPair::derive(1, "root", 0, 0);
        let root = Identity::root(keys.clone());

        assert_eq!(root.name(), ROOT);
        assert_eq!(root.credentials.holder_pk(), keys.pk);
        assert!(root.credentials.links.is_empty());
        assert_eq!(root.role.level(), 0);
    }
}
