//! Non-interactive proofs of knowledge for linear relations.
//!
//! A relation is a list of equations `target_i = Σ_j witness_j · base_ij`.
//! Every higher-level proof in this crate (pseudonym signatures, credential
//! binding, non-revocation, auditing) is one instance of it with its own
//! domain separator.

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::group::{GroupPoint, GroupScalar, Transcript};

/// One equation of a relation.
pub(crate) struct Equation {
    pub(crate) target: GroupPoint,
    pub(crate) bases: Vec<GroupPoint>,
}

impl Equation {
    pub(crate) fn new(target: GroupPoint, bases: Vec<GroupPoint>) -> Self {
        Self { target, bases }
    }

    fn combine(&self, exponents: &[GroupScalar]) -> GroupPoint {
        self.bases
            .iter()
            .zip(exponents)
            .fold(GroupPoint::identity(), |acc, (base, exponent)| {
                acc + *base * exponent
            })
    }
}

/// Challenge/response pair of a Fiat-Shamir sigma protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigmaProof {
    challenge: GroupScalar,
    responses: Vec<GroupScalar>,
}

fn challenge_for(
    domain: &'static str,
    context: &[u8],
    equations: &[Equation],
    commitments: &[GroupPoint],
) -> GroupScalar {
    let mut transcript = Transcript::new(domain);
    transcript.append_bytes(context);
    for equation in equations {
        transcript.append_point(&equation.target);
        for base in &equation.bases {
            transcript.append_point(base);
        }
    }
    for commitment in commitments {
        transcript.append_point(commitment);
    }
    transcript.challenge()
}

impl SigmaProof {
    /// Prove knowledge of `witnesses` satisfying every equation.
    pub(crate) fn prove<R: RngCore + CryptoRng>(
        rng: &mut R,
        domain: &'static str,
        context: &[u8],
        equations: &[Equation],
        witnesses: &[GroupScalar],
    ) -> Self {
        let nonces: Vec<GroupScalar> = witnesses
            .iter()
            .map(|_| GroupScalar::random(&mut *rng))
            .collect();
        let commitments: Vec<GroupPoint> = equations
            .iter()
            .map(|equation| equation.combine(&nonces))
            .collect();

        let challenge = challenge_for(domain, context, equations, &commitments);
        let responses = nonces
            .iter()
            .zip(witnesses)
            .map(|(nonce, witness)| *nonce + challenge * *witness)
            .collect();

        Self {
            challenge,
            responses,
        }
    }

    /// Check the proof against the same domain, context and equations.
    pub(crate) fn verify(&self, domain: &'static str, context: &[u8], equations: &[Equation]) -> bool {
        if equations
            .iter()
            .any(|equation| equation.bases.len() != self.responses.len())
        {
            return false;
        }

        let commitments: Vec<GroupPoint> = equations
            .iter()
            .map(|equation| {
                equation.combine(&self.responses) - equation.target * &self.challenge
            })
            .collect();

        challenge_for(domain, context, equations, &commitments) == self.challenge
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    fn two_base_relation(x: &GroupScalar, y: &GroupScalar, h: GroupPoint) -> Vec<Equation> {
        let target = GroupPoint::mul_base(x) + h * y;
        vec![Equation::new(target, vec![GroupPoint::generator(), h])]
    }

    #[test]
    fn test_valid_witness_verifies() {
        let h = GroupPoint::mul_base(&GroupScalar::random(&mut OsRng));
        let x = GroupScalar::random(&mut OsRng);
        let y = GroupScalar::random(&mut OsRng);

        let relation = two_base_relation(&x, &y, h);
        let proof = SigmaProof::prove(&mut OsRng, "test", b"ctx", &relation, &[x, y]);

        assert!(proof.verify("test", b"ctx", &relation));
    }

    #[test]
    fn test_wrong_witness_fails() {
        let h = GroupPoint::mul_base(&GroupScalar::random(&mut OsRng));
        let x = GroupScalar::random(&mut OsRng);
        let y = GroupScalar::random(&mut OsRng);

        let relation = two_base_relation(&x, &y, h);
        let wrong = GroupScalar::random(&mut OsRng);
        let proof = SigmaProof::prove(&mut OsRng, "test", b"ctx", &relation, &[x, wrong]);

        assert!(!proof.verify("test", b"ctx", &relation));
    }

    #[test]
    fn test_context_and_domain_are_bound() {
        let h = GroupPoint::mul_base(&GroupScalar::random(&mut OsRng));
        let x = GroupScalar::random(&mut OsRng);
        let y = GroupScalar::random(&mut OsRng);

        let relation = two_base_relation(&x, &y, h);
        let proof = SigmaProof::prove(&mut OsRng, "test", b"ctx", &relation, &[x, y]);

        assert!(!proof.verify("test", b"other", &relation));
        assert!(!proof.verify("other", b"ctx", &relation));
    }
}
