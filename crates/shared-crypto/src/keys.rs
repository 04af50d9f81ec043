//! Key material and system-wide public parameters.

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::group::{GroupPoint, GroupScalar, Transcript};

/// Public key: `sk · G`.
pub type PublicKey = GroupPoint;

/// Secret exponent.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SecretKey(pub(crate) GroupScalar);

impl SecretKey {
    /// Fresh random secret.
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self(GroupScalar::random(rng))
    }

    /// The matching public key.
    pub fn public_key(&self) -> PublicKey {
        GroupPoint::mul_base(&self.0)
    }

    /// Raw scalar, for key export by the owning process.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// A keypair tagged with its delegation level (0 = root).
#[derive(Debug, Clone)]
pub struct KeyPair {
    /// Delegation level the key is meant for.
    pub level: u8,
    /// Secret half.
    pub sk: SecretKey,
    /// Public half.
    pub pk: PublicKey,
}

impl KeyPair {
    fn from_secret(level: u8, sk: SecretKey) -> Self {
        Self {
            level,
            pk: sk.public_key(),
            sk,
        }
    }

    /// Deterministic keypair for a named role, derived from a run seed.
    ///
    /// Every process of a deployment that shares the seed derives the same
    /// key for the same `(role, id)`.
    pub fn derive(seed: u64, role: &str, id: u64, level: u8) -> Self {
        let mut transcript = Transcript::new("dac-key-derivation");
        transcript.append_u64(seed);
        transcript.append_bytes(role.as_bytes());
        transcript.append_u64(id);
        Self::from_secret(level, SecretKey(transcript.challenge()))
    }
}

/// Generate a random keypair for delegation level `level`.
pub fn generate_keys<R: RngCore + CryptoRng>(rng: &mut R, level: u8) -> KeyPair {
    KeyPair::from_secret(level, SecretKey::random(rng))
}

/// One-time pseudonym keys.
///
/// `pk = sk · G + nym_sk · h`, so the pseudonym hides `sk` behind fresh
/// randomness while remaining provably linked to it.
#[derive(Debug, Clone)]
pub struct NymKeys {
    /// Blinding secret.
    pub sk: SecretKey,
    /// Pseudonym public key.
    pub pk: PublicKey,
}

/// Derive a fresh pseudonym for the holder of `sk`.
pub fn generate_nym_keys<R: RngCore + CryptoRng>(
    rng: &mut R,
    sk: &SecretKey,
    params: &PublicParams,
) -> NymKeys {
    let nym_sk = SecretKey::random(rng);
    let pk = GroupPoint::mul_base(&sk.0) + params.h * &nym_sk.0;
    NymKeys { sk: nym_sk, pk }
}

/// Parameters every participant shares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicParams {
    /// Second generator with unknown discrete log relative to `G`.
    pub h: GroupPoint,
    /// Root authority public key.
    pub root_pk: PublicKey,
}

impl PublicParams {
    /// Set up a system from a seed; returns the parameters and the root key.
    pub fn from_seed(seed: u64) -> (Self, KeyPair) {
        let root = KeyPair::derive(seed, "root", 0, 0);
        let h_base = KeyPair::derive(seed, "second-generator", 0, 0);
        (
            Self {
                h: h_base.pk,
                root_pk: root.pk,
            },
            root,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn test_derive_is_deterministic() {
        let a = KeyPair::derive(1305, "peer", 3, 0);
        let b = KeyPair::derive(1305, "peer", 3, 0);
        let c = KeyPair::derive(1305, "peer", 4, 0);

        assert_eq!(a.pk, b.pk);
        assert_ne!(a.pk, c.pk);
    }

    #[test]
    fn test_params_from_seed_agree() {
        let (params_a, root_a) = PublicParams::from_seed(7);
        let (params_b, _) = PublicParams::from_seed(7);

        assert_eq!(params_a, params_b);
        assert_eq!(root_a.pk, params_a.root_pk);
        assert_ne!(params_a.h, params_a.root_pk);
    }

    #[test]
    fn test_nym_keys_are_fresh() {
        let (params, _) = PublicParams::from_seed(7);
        let keys = generate_keys(&mut OsRng, 2);

        let first = generate_nym_keys(&mut OsRng, &keys.sk, &params);
        let second = generate_nym_keys(&mut OsRng, &keys.sk, &params);

        assert_ne!(first.pk, second.pk);
        assert_ne!(first.pk, keys.pk);
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let keys = generate_keys(&mut OsRng, 1);
        assert_eq!(format!("{:?}", keys.sk), "SecretKey(<redacted>)");
    }
}
