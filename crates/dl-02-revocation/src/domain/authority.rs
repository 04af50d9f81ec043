//! # Revocation Authority
//!
//! Signs `(user revocation key, epoch · G)` for the epoch current at grant
//! time. The handle records that epoch so the user proves against it.

use rand::{CryptoRng, RngCore};
use shared_crypto::{epoch_generator, sign_non_revoke, KeyPair, PublicKey};
use shared_types::{NonRevocationHandle, NonRevocationRequest, ProtocolViolation, REVOCATION_AUTHORITY};

/// Holder of the revocation signing key.
#[derive(Debug, Clone)]
pub struct RevocationAuthority {
    keys: KeyPair,
}

impl RevocationAuthority {
    pub fn new(keys: KeyPair) -> Self {
        Self { keys }
    }

    /// Authority whose key is derived from the run seed, so every process
    /// of a deployment agrees on it.
    pub fn from_seed(seed: u64) -> Self {
        Self::new(KeyPair::derive(seed, REVOCATION_AUTHORITY, 0, 0))
    }

    pub fn public_key(&self) -> PublicKey {
        self.keys.pk
    }

    /// Grant a handle for `request` valid during `epoch`.
    pub fn grant<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        request: &NonRevocationRequest,
        epoch: u64,
    ) -> NonRevocationHandle {
        NonRevocationHandle {
            handle: sign_non_revoke(rng, &self.keys.sk, &request.user_pk, epoch),
            epoch,
        }
    }
}

/// User-side check of a freshly granted handle.
pub fn verify_handle(
    handle: &NonRevocationHandle,
    authority_pk: &PublicKey,
    user_pk: &PublicKey,
) -> Result<(), ProtocolViolation> {
    handle
        .handle
        .verify(authority_pk, user_pk, &epoch_generator(handle.epoch))
        .map_err(|_| ProtocolViolation::InvalidNonRevocationHandle {
            epoch: handle.epoch,
        })
}
