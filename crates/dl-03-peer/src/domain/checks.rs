//! # Peer Checks
//!
//! Synchronous verification steps of endorsement, ordering and validation.
//! Each failure maps to the [`ProtocolViolation`] naming the step.

use shared_crypto::{schnorr, CredentialProof, PublicKey, PublicParams};
use shared_types::{
    Endorsement, Operation, PeerId, ProtocolViolation, Transaction, TransactionProposal,
};
use sim_telemetry::{CryptoEvent, SimulationRecorder};

use super::cache::{proof_key, ProofCache};

/// Keys a validating peer checks transactions against.
#[derive(Debug, Clone)]
pub struct TrustAnchors {
    pub params: PublicParams,
    pub auditor_pk: PublicKey,
    pub revocation_pk: PublicKey,
}

/// Proposal pseudonym signature over its canonical bytes.
pub fn check_proposal_signature(
    proposal: &TransactionProposal,
    params: &PublicParams,
    operation: Operation,
    recorder: &SimulationRecorder,
) -> Result<(), ProtocolViolation> {
    recorder.record(CryptoEvent::VerifyNym);
    proposal
        .signature
        .verify(&proposal.nym_pk, params, &proposal.canonical_bytes())
        .map_err(|_| ProtocolViolation::InvalidNymSignature { operation })
}

/// Transaction pseudonym signature, made over the embedded proposal.
pub fn check_transaction_signature(
    transaction: &Transaction,
    params: &PublicParams,
    recorder: &SimulationRecorder,
) -> Result<(), ProtocolViolation> {
    recorder.record(CryptoEvent::VerifyNym);
    let proposal = &transaction.proposal;
    transaction
        .signature
        .verify(&proposal.nym_pk, params, &proposal.canonical_bytes())
        .map_err(|_| ProtocolViolation::InvalidNymSignature {
            operation: Operation::Validation,
        })
}

/// Verify the author's identity proof unless `cache` already holds it for
/// `operation`. Returns whether the expensive verification ran.
pub fn check_identity(
    proposal: &TransactionProposal,
    params: &PublicParams,
    cache: &ProofCache,
    operation: Operation,
    recorder: &SimulationRecorder,
) -> Result<bool, ProtocolViolation> {
    let key = proof_key(&proposal.proof);
    recorder.record(CryptoEvent::Hash);
    if cache.contains(operation, &key) {
        return Ok(false);
    }

    recorder.record(CryptoEvent::CredVerify);
    CredentialProof::from_bytes(&proposal.proof)
        .and_then(|proof| proof.verify(params, &proposal.nym_pk, &proposal.indices))
        .map_err(|source| ProtocolViolation::InvalidIdentityProof { operation, source })?;
    cache.insert(operation, key);
    Ok(true)
}

/// At least `threshold` endorsements.
pub fn check_quorum(transaction: &Transaction, threshold: usize) -> Result<(), ProtocolViolation> {
    let got = transaction.endorsements.len();
    if got < threshold {
        return Err(ProtocolViolation::TooFewEndorsements {
            got,
            need: threshold,
        });
    }
    Ok(())
}

fn verify_endorsement(
    endorsement: &Endorsement,
    proposal: &TransactionProposal,
    endorser_pk: Option<PublicKey>,
) -> Result<(), ProtocolViolation> {
    let endorser = endorsement.endorser;
    let pk = endorser_pk.ok_or(ProtocolViolation::UnknownEndorser(endorser))?;
    schnorr::verify(&pk, &endorsement.signature, &proposal.canonical_bytes())
        .map_err(|_| ProtocolViolation::InvalidEndorsement { endorser })
}

/// One endorsement against the endorser's known key, as a user receives it.
pub fn check_endorsement(
    endorsement: &Endorsement,
    proposal: &TransactionProposal,
    endorser_pk: Option<PublicKey>,
    recorder: &SimulationRecorder,
) -> Result<(), ProtocolViolation> {
    recorder.record(CryptoEvent::VerifySchnorr);
    verify_endorsement(endorsement, proposal, endorser_pk)
}

/// Every endorsement of `transaction`, counted as one batch verification.
pub fn check_endorsements<F>(
    transaction: &Transaction,
    endorser_pk: F,
    recorder: &SimulationRecorder,
) -> Result<(), ProtocolViolation>
where
    F: Fn(PeerId) -> Option<PublicKey>,
{
    for endorsement in &transaction.endorsements {
        verify_endorsement(endorsement, &transaction.proposal, endorser_pk(endorsement.endorser))?;
    }
    recorder.record(CryptoEvent::VerifySchnorr);
    Ok(())
}

/// Audit proof, required when auditing is on.
pub fn check_audit(
    transaction: &Transaction,
    anchors: &TrustAnchors,
    recorder: &SimulationRecorder,
) -> Result<(), ProtocolViolation> {
    let audit = transaction
        .audit
        .as_ref()
        .ok_or_else(|| ProtocolViolation::InvalidAuditProof("missing audit data".to_string()))?;
    recorder.record(CryptoEvent::AuditVerify);
    audit
        .proof
        .verify(
            &audit.encryption,
            &transaction.proposal.nym_pk,
            &anchors.auditor_pk,
            &anchors.params,
        )
        .map_err(|e| ProtocolViolation::InvalidAuditProof(e.to_string()))
}

/// Non-revocation proof for the transaction's epoch, required when
/// revocation is on.
pub fn check_non_revocation(
    transaction: &Transaction,
    anchors: &TrustAnchors,
    recorder: &SimulationRecorder,
) -> Result<(), ProtocolViolation> {
    let proof = transaction.non_revocation.as_ref().ok_or_else(|| {
        ProtocolViolation::InvalidNonRevocation("missing non-revocation proof".to_string())
    })?;
    recorder.record(CryptoEvent::NonRevokeVerify);
    proof
        .verify(
            &transaction.proposal.nym_pk,
            transaction.epoch,
            &anchors.params,
            &anchors.revocation_pk,
        )
        .map_err(|e| ProtocolViolation::InvalidNonRevocation(e.to_string()))
}
