//! # Schnorr Signatures
//!
//! Plain Schnorr over secp256k1, used for endorsements and for signing
//! credential links. `e = H(R ‖ P ‖ m)`, `s = k + e·x`.

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::group::{GroupPoint, GroupScalar, Transcript};
use crate::keys::{PublicKey, SecretKey};
use crate::CryptoError;

/// A Schnorr signature `(R, s)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchnorrSignature {
    r: GroupPoint,
    s: GroupScalar,
}

fn challenge(r: &GroupPoint, pk: &PublicKey, message: &[u8]) -> GroupScalar {
    let mut transcript = Transcript::new("schnorr");
    transcript.append_point(r);
    transcript.append_point(pk);
    transcript.append_bytes(message);
    transcript.challenge()
}

/// Sign `message` under `sk`.
pub fn sign<R: RngCore + CryptoRng>(rng: &mut R, sk: &SecretKey, message: &[u8]) -> SchnorrSignature {
    let k = GroupScalar::random(rng);
    let r = GroupPoint::mul_base(&k);
    let e = challenge(&r, &sk.public_key(), message);
    SchnorrSignature { r, s: k + e * sk.0 }
}

/// Verify `signature` on `message` under `pk`.
pub fn verify(pk: &PublicKey, signature: &SchnorrSignature, message: &[u8]) -> Result<(), CryptoError> {
    let e = challenge(&signature.r, pk, message);
    if GroupPoint::mul_base(&signature.s) == signature.r + *pk * &e {
        Ok(())
    } else {
        Err(CryptoError::SignatureVerificationFailed)
    }
}
