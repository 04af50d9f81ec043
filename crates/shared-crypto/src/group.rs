//! # Group Elements and Transcripts
//!
//! Thin wrappers over secp256k1 points and scalars that serialize as fixed
//! byte arrays, plus the SHA3 transcript used to derive Fiat-Shamir challenges.

use k256::elliptic_curve::group::GroupEncoding;
use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::{Field, PrimeField};
use k256::{FieldBytes, ProjectivePoint, Scalar, U256};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use sha3::{Digest, Sha3_256};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use crate::CryptoError;

/// Compressed SEC1 length of a point.
pub const POINT_SIZE: usize = 33;

/// Length of a scalar encoding.
pub const SCALAR_SIZE: usize = 32;

/// SHA3-256 of `raw`.
pub fn sha3_256(raw: &[u8]) -> [u8; 32] {
    Sha3_256::digest(raw).into()
}

#[serde_as]
#[derive(Serialize, Deserialize)]
struct PointBytes(#[serde_as(as = "Bytes")] [u8; POINT_SIZE]);

#[serde_as]
#[derive(Serialize, Deserialize)]
struct ScalarBytes(#[serde_as(as = "Bytes")] [u8; SCALAR_SIZE]);

/// A point of the secp256k1 group.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "PointBytes", try_from = "PointBytes")]
pub struct GroupPoint(pub(crate) ProjectivePoint);

impl GroupPoint {
    /// The standard generator `G`.
    pub fn generator() -> Self {
        Self(ProjectivePoint::GENERATOR)
    }

    /// The neutral element.
    pub fn identity() -> Self {
        Self(ProjectivePoint::IDENTITY)
    }

    /// `G * scalar`.
    pub fn mul_base(scalar: &GroupScalar) -> Self {
        Self(ProjectivePoint::GENERATOR * scalar.0)
    }

    /// Compressed SEC1 encoding.
    pub fn to_bytes(&self) -> [u8; POINT_SIZE] {
        let mut out = [0u8; POINT_SIZE];
        out.copy_from_slice(self.0.to_bytes().as_slice());
        out
    }

    /// Decode a compressed SEC1 encoding.
    pub fn from_bytes(bytes: &[u8; POINT_SIZE]) -> Result<Self, CryptoError> {
        let repr = k256::CompressedPoint::clone_from_slice(bytes);
        Option::<ProjectivePoint>::from(ProjectivePoint::from_bytes(&repr))
            .map(Self)
            .ok_or(CryptoError::InvalidPoint)
    }
}

impl fmt::Debug for GroupPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.to_bytes();
        write!(f, "GroupPoint(")?;
        for b in &bytes[..6] {
            write!(f, "{b:02x}")?;
        }
        write!(f, "..)")
    }
}

impl std::hash::Hash for GroupPoint {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.to_bytes().hash(state);
    }
}

impl From<GroupPoint> for PointBytes {
    fn from(point: GroupPoint) -> Self {
        PointBytes(point.to_bytes())
    }
}

impl TryFrom<PointBytes> for GroupPoint {
    type Error = CryptoError;

    fn try_from(bytes: PointBytes) -> Result<Self, Self::Error> {
        GroupPoint::from_bytes(&bytes.0)
    }
}

impl Add for GroupPoint {
    type Output = GroupPoint;

    fn add(self, rhs: GroupPoint) -> GroupPoint {
        GroupPoint(self.0 + rhs.0)
    }
}

impl Sub for GroupPoint {
    type Output = GroupPoint;

    fn sub(self, rhs: GroupPoint) -> GroupPoint {
        GroupPoint(self.0 - rhs.0)
    }
}

impl Mul<&GroupScalar> for GroupPoint {
    type Output = GroupPoint;

    fn mul(self, rhs: &GroupScalar) -> GroupPoint {
        GroupPoint(self.0 * rhs.0)
    }
}

/// An element of the scalar field.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "ScalarBytes", try_from = "ScalarBytes")]
pub struct GroupScalar(pub(crate) Scalar);

impl GroupScalar {
    /// Uniformly random scalar.
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self(Scalar::random(&mut *rng))
    }

    /// Small integer embedding, used for epoch numbers.
    pub fn from_u64(value: u64) -> Self {
        Self(Scalar::from(value))
    }

    /// Reduce a 32-byte digest into the field.
    pub fn from_digest(digest: [u8; 32]) -> Self {
        let bytes = FieldBytes::from(digest);
        Self(<Scalar as Reduce<U256>>::reduce_bytes(&bytes))
    }

    /// Big-endian encoding.
    pub fn to_bytes(&self) -> [u8; SCALAR_SIZE] {
        self.0.to_bytes().into()
    }

    /// Decode a canonical big-endian encoding.
    pub fn from_bytes(bytes: &[u8; SCALAR_SIZE]) -> Result<Self, CryptoError> {
        Option::<Scalar>::from(Scalar::from_repr(FieldBytes::from(*bytes)))
            .map(Self)
            .ok_or(CryptoError::InvalidScalar)
    }
}

impl fmt::Debug for GroupScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GroupScalar(..)")
    }
}

impl From<GroupScalar> for ScalarBytes {
    fn from(scalar: GroupScalar) -> Self {
        ScalarBytes(scalar.to_bytes())
    }
}

impl TryFrom<ScalarBytes> for GroupScalar {
    type Error = CryptoError;

    fn try_from(bytes: ScalarBytes) -> Result<Self, Self::Error> {
        GroupScalar::from_bytes(&bytes.0)
    }
}

impl Add for GroupScalar {
    type Output = GroupScalar;

    fn add(self, rhs: GroupScalar) -> GroupScalar {
        GroupScalar(self.0 + rhs.0)
    }
}

impl Mul for GroupScalar {
    type Output = GroupScalar;

    fn mul(self, rhs: GroupScalar) -> GroupScalar {
        GroupScalar(self.0 * rhs.0)
    }
}

impl Neg for GroupScalar {
    type Output = GroupScalar;

    fn neg(self) -> GroupScalar {
        GroupScalar(-self.0)
    }
}

/// Fiat-Shamir transcript over SHA3-256.
///
/// Every appended item is length-prefixed so distinct item sequences never
/// hash to the same input.
pub(crate) struct Transcript {
    hasher: Sha3_256,
}

impl Transcript {
    pub(crate) fn new(domain: &'static str) -> Self {
        let mut transcript = Self {
            hasher: Sha3_256::new(),
        };
        transcript.append_bytes(domain.as_bytes());
        transcript
    }

    pub(crate) fn append_bytes(&mut self, bytes: &[u8]) {
        self.hasher.update((bytes.len() as u64).to_be_bytes());
        self.hasher.update(bytes);
    }

    pub(crate) fn append_point(&mut self, point: &GroupPoint) {
        self.append_bytes(&point.to_bytes());
    }

    pub(crate) fn append_u64(&mut self, value: u64) {
        self.append_bytes(&value.to_be_bytes());
    }

    pub(crate) fn challenge(self) -> GroupScalar {
        GroupScalar::from_digest(self.hasher.finalize().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn test_point_encoding_restores_point() {
        let scalar = GroupScalar::random(&mut OsRng);
        let point = GroupPoint::mul_base(&scalar);

        let restored = GroupPoint::from_bytes(&point.to_bytes()).unwrap();
        assert_eq!(point, restored);
    }

    #[test]
    fn test_invalid_point_rejected() {
        let mut bytes = [0xFFu8; POINT_SIZE];
        bytes[0] = 0x05;
        assert_eq!(GroupPoint::from_bytes(&bytes), Err(CryptoError::InvalidPoint));
    }

    #[test]
    fn test_scalar_arithmetic_matches_group() {
        let a = GroupScalar::random(&mut OsRng);
        let b = GroupScalar::random(&mut OsRng);

        let lhs = GroupPoint::mul_base(&(a + b));
        let rhs = GroupPoint::mul_base(&a) + GroupPoint::mul_base(&b);
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn test_transcript_is_order_sensitive() {
        let mut first = Transcript::new("test");
        first.append_bytes(b"ab");
        first.append_bytes(b"c");

        let mut second = Transcript::new("test");
        second.append_bytes(b"a");
        second.append_bytes(b"bc");

        assert_ne!(first.challenge(), second.challenge());
    }

    #[test]
    fn test_sha3_known_vector() {
        assert_eq!(
            hex::encode(sha3_256(b"")),
            "a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a"
        );
    }
}
