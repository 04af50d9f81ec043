//! # Auditable Encryption
//!
//! Every transaction carries an ElGamal encryption of its author's public key
//! under the auditor key, together with a proof that the ciphertext, the
//! pseudonym and the author's secret are consistent. Only the auditor can
//! open it; fresh randomness per transaction keeps two ciphertexts of the same
//! author unlinkable.

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::group::{GroupPoint, GroupScalar};
use crate::keys::{NymKeys, PublicKey, PublicParams, SecretKey};
use crate::sigma::{Equation, SigmaProof};
use crate::CryptoError;

/// ElGamal ciphertext `(r·G, pk + r·A)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditingEncryption {
    c1: GroupPoint,
    c2: GroupPoint,
}

/// Encryption randomness, needed once to build the proof.
pub struct AuditingRandomness(GroupScalar);

/// Encrypt `user_pk` for the auditor.
pub fn auditing_encrypt<R: RngCore + CryptoRng>(
    rng: &mut R,
    auditor_pk: &PublicKey,
    user_pk: &PublicKey,
) -> (AuditingEncryption, AuditingRandomness) {
    let r = GroupScalar::random(rng);
    let encryption = AuditingEncryption {
        c1: GroupPoint::mul_base(&r),
        c2: *user_pk + *auditor_pk * &r,
    };
    (encryption, AuditingRandomness(r))
}

impl AuditingEncryption {
    /// Recover the encrypted public key.
    pub fn decrypt(&self, auditor_sk: &SecretKey) -> PublicKey {
        self.c2 - self.c1 * &auditor_sk.0
    }
}

fn equations(
    encryption: &AuditingEncryption,
    nym_pk: PublicKey,
    auditor_pk: PublicKey,
    params: &PublicParams,
) -> Vec<Equation> {
    let g = GroupPoint::generator();
    let o = GroupPoint::identity();
    // witnesses: (sk, nym_sk, r)
    vec![
        Equation::new(encryption.c1, vec![o, o, g]),
        Equation::new(encryption.c2, vec![g, o, auditor_pk]),
        Equation::new(nym_pk, vec![g, params.h, o]),
    ]
}

/// Proof that an [`AuditingEncryption`] encrypts the pseudonym owner's key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditingProof(SigmaProof);

impl AuditingProof {
    /// Prove that `encryption` was produced with `randomness` over
    /// `sk · G`, the key behind pseudonym `nym`.
    pub fn prove<R: RngCore + CryptoRng>(
        rng: &mut R,
        encryption: &AuditingEncryption,
        randomness: &AuditingRandomness,
        sk: &SecretKey,
        nym: &NymKeys,
        auditor_pk: &PublicKey,
        params: &PublicParams,
    ) -> Self {
        Self(SigmaProof::prove(
            rng,
            "auditing",
            &[],
            &equations(encryption, nym.pk, *auditor_pk, params),
            &[sk.0, nym.sk.0, randomness.0],
        ))
    }

    /// Verify against the ciphertext, pseudonym and auditor key.
    pub fn verify(
        &self,
        encryption: &AuditingEncryption,
        nym_pk: &PublicKey,
        auditor_pk: &PublicKey,
        params: &PublicParams,
    ) -> Result<(), CryptoError> {
        if self
            .0
            .verify("auditing", &[], &equations(encryption, *nym_pk, *auditor_pk, params))
        {
            Ok(())
        } else {
            Err(CryptoError::InvalidAuditingProof)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{generate_keys, generate_nym_keys};
    use rand::rngs::OsRng;

    #[test]
    fn test_decrypt_recovers_author() {
        let auditor = generate_keys(&mut OsRng, 2);
        let user = generate_keys(&mut OsRng, 2);

        let (encryption, _) = auditing_encrypt(&mut OsRng, &auditor.pk, &user.pk);
        assert_eq!(encryption.decrypt(&auditor.sk), user.pk);
    }

    #[test]
    fn test_encryptions_are_unlinkable() {
        let auditor = generate_keys(&mut OsRng, 2);
        let user = generate_keys(&mut OsRng, 2);

        let (first, _) = auditing_encrypt(&mut OsRng, &auditor.pk, &user.pk);
        let (second, _) = auditing_encrypt(&mut OsRng, &auditor.pk, &user.pk);
        assert_ne!(first, second);
    }

    #[test]
    fn test_auditing_proof() {
        let (params, _) = PublicParams::from_seed(9);
        let auditor = generate_keys(&mut OsRng, 2);
        let user = generate_keys(&mut OsRng, 2);
        let nym = generate_nym_keys(&mut OsRng, &user.sk, &params);

        let (encryption, randomness) = auditing_encrypt(&mut OsRng, &auditor.pk, &user.pk);
        let proof = AuditingProof::prove(
            &mut OsRng,
            &encryption,
            &randomness,
            &user.sk,
            &nym,
            &auditor.pk,
            &params,
        );

        assert!(proof
            .verify(&encryption, &nym.pk, &auditor.pk, &params)
            .is_ok());
    }

    #[test]
    fn test_auditing_proof_rejects_foreign_ciphertext() {
        let (params, _) = PublicParams::from_seed(9);
        let auditor = generate_keys(&mut OsRng, 2);
        let user = generate_keys(&mut OsRng, 2);
        let other = generate_keys(&mut OsRng, 2);
        let nym = generate_nym_keys(&mut OsRng, &user.sk, &params);

        let (encryption, randomness) = auditing_encrypt(&mut OsRng, &auditor.pk, &user.pk);
        let proof = AuditingProof::prove(
            &mut OsRng,
            &encryption,
            &randomness,
            &user.sk,
            &nym,
            &auditor.pk,
            &params,
        );
        let (framed, _) = auditing_encrypt(&mut OsRng, &auditor.pk, &other.pk);

        assert_eq!(
            proof.verify(&framed, &nym.pk, &auditor.pk, &params),
            Err(CryptoError::InvalidAuditingProof)
        );
    }
}
