//! # Proposal and Transaction Assembly
//!
//! A proposal proves the post-right attribute under a one-time pseudonym
//! and is signed under it. The transaction re-signs the proposal and, when
//! enabled, adds a non-revocation proof and a fresh audit encryption.

use dl_01_issuance::POST_RIGHT_INDEX;
use rand::{CryptoRng, RngCore};
use shared_crypto::{
    auditing_encrypt, generate_nym_keys, sign_nym, AuditingProof,
    CryptoError, GrothSignature, Index, NymKeys, PublicKey, PublicParams, RevocationProof,
};
use shared_types::{
    canonical_bytes, AuditData, Endorsement, Identity, ProtocolViolation, Transaction,
    TransactionProposal, CHAINCODE,
};
use sim_telemetry::{CryptoEvent, SimulationRecorder};

/// The attribute a proposal discloses.
pub fn post_right_index(identity: &Identity) -> Result<Index, ProtocolViolation> {
    let (link, position) = POST_RIGHT_INDEX;
    identity
        .credentials
        .attribute(link, position)
        .map(|attribute| Index {
            link,
            position,
            attribute,
        })
        .ok_or_else(|| ProtocolViolation::InvalidCredentials {
            holder: identity.name(),
            source: CryptoError::IndexOutOfRange { link, position },
        })
}

/// Proposal for `hash` by `identity`, with the pseudonym that signed it.
pub fn build_proposal<R: RngCore + CryptoRng>(
    rng: &mut R,
    identity: &Identity,
    params: &PublicParams,
    hash: [u8; 32],
    recorder: &SimulationRecorder,
) -> Result<(TransactionProposal, NymKeys), ProtocolViolation> {
    let nym = generate_nym_keys(rng, &identity.keys.sk, params);
    let indices = vec![post_right_index(identity)?];

    let proof = identity
        .credentials
        .prove(rng, &identity.keys.sk, &nym, &indices, params)
        .map_err(|source| ProtocolViolation::InvalidCredentials {
            holder: identity.name(),
            source,
        })?
        .to_bytes();
    recorder.record(CryptoEvent::CredProve);

    let signature = sign_nym(
        rng,
        &nym,
        &identity.keys.sk,
        params,
        &canonical_bytes(&hash, CHAINCODE, identity.id, &proof),
    );
    recorder.record(CryptoEvent::SignNym);

    let proposal = TransactionProposal {
        hash,
        author_id: identity.id,
        chaincode: CHAINCODE.to_string(),
        proof,
        nym_pk: nym.pk,
        indices,
        signature,
    };
    Ok((proposal, nym))
}

/// What the transaction carries beyond the proposal and endorsements.
pub struct Attachments<'a> {
    /// Handle and the epoch it was granted for, when revocation is on.
    pub non_revocation: Option<(&'a GrothSignature, u64)>,
    /// Auditor key, when auditing is on.
    pub auditor_pk: Option<&'a PublicKey>,
}

/// Assemble the transaction for `proposal`. The epoch is the handle's
/// epoch, or 0 without revocation.
pub fn assemble_transaction<R: RngCore + CryptoRng>(
    rng: &mut R,
    identity: &Identity,
    params: &PublicParams,
    nym: &NymKeys,
    proposal: TransactionProposal,
    endorsements: Vec<Endorsement>,
    attachments: Attachments<'_>,
    recorder: &SimulationRecorder,
) -> Transaction {
    let sk = &identity.keys.sk;
    let signature = sign_nym(rng, nym, sk, params, &proposal.canonical_bytes());
    recorder.record(CryptoEvent::SignNym);

    let (non_revocation, epoch) = match attachments.non_revocation {
        Some((handle, epoch)) => {
            let proof = RevocationProof::prove(rng, handle, sk, nym, epoch, params);
            recorder.record(CryptoEvent::NonRevokeProve);
            (Some(proof), epoch)
        }
        None => (None, 0),
    };

    // Fresh randomness every transaction keeps them unlinkable.
    let audit = attachments.auditor_pk.map(|auditor_pk| {
        let (encryption, randomness) = auditing_encrypt(rng, auditor_pk, &identity.keys.pk);
        recorder.record(CryptoEvent::AuditEncrypt);
        let proof = AuditingProof::prove(rng, &encryption, &randomness, sk, nym, auditor_pk, params);
        recorder.record(CryptoEvent::AuditProve);
        AuditData { encryption, proof }
    });

    Transaction {
        signature,
        proposal,
        audit,
        endorsements,
        non_revocation,
        epoch,
        orderer: None,
    }
}
