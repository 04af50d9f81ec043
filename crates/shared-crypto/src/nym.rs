//! Pseudonym signatures: a proof of knowledge of `(sk, nym_sk)` opening the
//! pseudonym key, bound to the signed message.

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::group::GroupPoint;
use crate::keys::{NymKeys, PublicKey, PublicParams, SecretKey};
use crate::sigma::{Equation, SigmaProof};
use crate::CryptoError;

/// Signature under a one-time pseudonym.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NymSignature(SigmaProof);

fn equations(nym_pk: PublicKey, params: &PublicParams) -> [Equation; 1] {
    [Equation::new(nym_pk, vec![GroupPoint::generator(), params.h])]
}

/// Sign `message` under the pseudonym `nym` of the holder of `sk`.
pub fn sign_nym<R: RngCore + CryptoRng>(
    rng: &mut R,
    nym: &NymKeys,
    sk: &SecretKey,
    params: &PublicParams,
    message: &[u8],
) -> NymSignature {
    NymSignature(SigmaProof::prove(
        rng,
        "nym-signature",
        message,
        &equations(nym.pk, params),
        &[sk.0, nym.sk.0],
    ))
}

impl NymSignature {
    /// Verify against the pseudonym key and message.
    pub fn verify(
        &self,
        nym_pk: &PublicKey,
        params: &PublicParams,
        message: &[u8],
    ) -> Result<(), CryptoError> {
        if self
            .0
            .verify("nym-signature", message, &equations(*nym_pk, params))
        {
            Ok(())
        } else {
            Err(CryptoError::NymSignatureVerificationFailed)
        }
    }

    /// Wire encoding.
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).unwrap_or_default()
    }
}
