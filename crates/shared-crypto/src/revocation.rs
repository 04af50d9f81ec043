//! # Non-Revocation
//!
//! The revocation authority signs `(user revocation key, epoch · G)` for the
//! current epoch. A handle is only good for that epoch; users refresh it when
//! the epoch advances and attach a proof that ties it to their pseudonym.

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::group::{GroupPoint, GroupScalar};
use crate::keys::{NymKeys, PublicKey, PublicParams, SecretKey};
use crate::schnorr::{self, SchnorrSignature};
use crate::sigma::{Equation, SigmaProof};
use crate::CryptoError;

/// `epoch · G`, the per-epoch generator.
pub fn epoch_generator(epoch: u64) -> GroupPoint {
    GroupPoint::mul_base(&GroupScalar::from_u64(epoch))
}

fn handle_message(user_pk: &PublicKey, epoch_point: &GroupPoint) -> Vec<u8> {
    let mut message = Vec::with_capacity(66);
    message.extend_from_slice(&user_pk.to_bytes());
    message.extend_from_slice(&epoch_point.to_bytes());
    message
}

/// Time-bounded signature over a user's revocation key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrothSignature(SchnorrSignature);

/// Authority signs `user_pk` for `epoch`.
pub fn sign_non_revoke<R: RngCore + CryptoRng>(
    rng: &mut R,
    authority_sk: &SecretKey,
    user_pk: &PublicKey,
    epoch: u64,
) -> GrothSignature {
    let message = handle_message(user_pk, &epoch_generator(epoch));
    GrothSignature(schnorr::sign(rng, authority_sk, &message))
}

impl GrothSignature {
    /// Verify against the authority key and the signed pair
    /// `(user_pk, epoch_point)`.
    pub fn verify(
        &self,
        authority_pk: &PublicKey,
        user_pk: &PublicKey,
        epoch_point: &GroupPoint,
    ) -> Result<(), CryptoError> {
        schnorr::verify(authority_pk, &self.0, &handle_message(user_pk, epoch_point))
            .map_err(|_| CryptoError::InvalidNonRevocationHandle)
    }

    /// Wire encoding.
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).unwrap_or_default()
    }
}

fn binding_equations(user_pk: PublicKey, nym_pk: PublicKey, params: &PublicParams) -> Vec<Equation> {
    vec![
        Equation::new(user_pk, vec![GroupPoint::generator(), GroupPoint::identity()]),
        Equation::new(nym_pk, vec![GroupPoint::generator(), params.h]),
    ]
}

/// Proof that the pseudonym's owner holds a handle for `epoch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationProof {
    handle: GrothSignature,
    user_pk: PublicKey,
    epoch: u64,
    binding: SigmaProof,
}

impl RevocationProof {
    /// Prove possession of `handle` (issued to `sk · G` for `epoch`) under
    /// pseudonym `nym`.
    pub fn prove<R: RngCore + CryptoRng>(
        rng: &mut R,
        handle: &GrothSignature,
        sk: &SecretKey,
        nym: &NymKeys,
        epoch: u64,
        params: &PublicParams,
    ) -> Self {
        let user_pk = sk.public_key();
        let binding = SigmaProof::prove(
            rng,
            "non-revocation",
            &epoch.to_be_bytes(),
            &binding_equations(user_pk, nym.pk, params),
            &[sk.0, nym.sk.0],
        );
        Self {
            handle: handle.clone(),
            user_pk,
            epoch,
            binding,
        }
    }

    /// Verify for pseudonym `nym_pk` at `epoch` under the authority key.
    pub fn verify(
        &self,
        nym_pk: &PublicKey,
        epoch: u64,
        params: &PublicParams,
        authority_pk: &PublicKey,
    ) -> Result<(), CryptoError> {
        if self.epoch != epoch {
            return Err(CryptoError::InvalidRevocationProof("epoch mismatch"));
        }
        self.handle
            .verify(authority_pk, &self.user_pk, &epoch_generator(epoch))
            .map_err(|_| CryptoError::InvalidRevocationProof("handle does not verify"))?;
        if self.binding.verify(
            "non-revocation",
            &epoch.to_be_bytes(),
            &binding_equations(self.user_pk, *nym_pk, params),
        ) {
            Ok(())
        } else {
            Err(CryptoError::InvalidRevocationProof("pseudonym binding failed"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{generate_keys, generate_nym_keys};
    use rand::rngs::OsRng;

    #[test]
    fn test_handle_verifies_for_its_epoch_only() {
        let authority = generate_keys(&mut OsRng, 0);
        let user = generate_keys(&mut OsRng, 2);

        let handle = sign_non_revoke(&mut OsRng, &authority.sk, &user.pk, 4);

        assert!(handle
            .verify(&authority.pk, &user.pk, &epoch_generator(4))
            .is_ok());
        assert_eq!(
            handle.verify(&authority.pk, &user.pk, &epoch_generator(5)),
            Err(CryptoError::InvalidNonRevocationHandle)
        );
    }

    #[test]
    fn test_revocation_proof_round() {
        let (params, _) = PublicParams::from_seed(5);
        let authority = generate_keys(&mut OsRng, 0);
        let user = generate_keys(&mut OsRng, 2);
        let nym = generate_nym_keys(&mut OsRng, &user.sk, &params);

        let handle = sign_non_revoke(&mut OsRng, &authority.sk, &user.pk, 2);
        let proof = RevocationProof::prove(&mut OsRng, &handle, &user.sk, &nym, 2, &params);

        assert!(proof.verify(&nym.pk, 2, &params, &authority.pk).is_ok());
        assert!(proof.verify(&nym.pk, 3, &params, &authority.pk).is_err());
    }

    #[test]
    fn test_revocation_proof_rejects_other_authority() {
        let (params, _) = PublicParams::from_seed(5);
        let authority = generate_keys(&mut OsRng, 0);
        let impostor = generate_keys(&mut OsRng, 0);
        let user = generate_keys(&mut OsRng, 2);
        let nym = generate_nym_keys(&mut OsRng, &user.sk, &params);

        let handle = sign_non_revoke(&mut OsRng, &impostor.sk, &user.pk, 1);
        let proof = RevocationProof::prove(&mut OsRng, &handle, &user.sk, &nym, 1, &params);

        assert_eq!(
            proof.verify(&nym.pk, 1, &params, &authority.pk),
            Err(CryptoError::InvalidRevocationProof("handle does not verify"))
        );
    }
}
