//! # Audit Pass
//!
//! After the run the auditor decrypts the audit encryption of every
//! committed transaction and compares it with the author's public key.
//! Decryptions run in parallel.

use rayon::prelude::*;
use shared_crypto::{PublicKey, SecretKey};
use shared_types::{AuditRecord, ProtocolViolation, Transaction, UserId};
use sim_telemetry::{CryptoEvent, SimulationRecorder};
use std::collections::HashMap;

/// Check every transaction of the ledger. `authors` maps a user ID to its
/// public key. Returns the number of transactions audited.
pub fn audit_transactions(
    transactions: &[Transaction],
    auditor_sk: &SecretKey,
    authors: &HashMap<UserId, PublicKey>,
    recorder: &SimulationRecorder,
) -> Result<usize, ProtocolViolation> {
    transactions.par_iter().try_for_each(|transaction| {
        let author_id = transaction.proposal.author_id;
        let audit = transaction.audit.as_ref().ok_or_else(|| {
            ProtocolViolation::InvalidAuditProof(format!("transaction of user {author_id} has no audit data"))
        })?;
        let decrypted = audit.encryption.decrypt(auditor_sk);
        recorder.record(CryptoEvent::AuditDecrypt);
        match authors.get(&author_id) {
            Some(pk) if *pk == decrypted => Ok(()),
            _ => Err(ProtocolViolation::AuditMismatch { author_id }),
        }
    })?;
    Ok(transactions.len())
}

/// Decrypt the audit records a peer reports. The auditor of a distributed
/// deployment knows no user keys, so it checks that every record of one
/// author decrypts to the same key. Returns the key of each author.
pub fn audit_records(
    records: &[AuditRecord],
    auditor_sk: &SecretKey,
    recorder: &SimulationRecorder,
) -> Result<HashMap<UserId, PublicKey>, ProtocolViolation> {
    let decrypted: Vec<(UserId, PublicKey)> = records
        .par_iter()
        .map(|record| {
            recorder.record(CryptoEvent::AuditDecrypt);
            (record.author_id, record.encryption.decrypt(auditor_sk))
        })
        .collect();

    let mut authors = HashMap::new();
    for (author_id, pk) in decrypted {
        match authors.insert(author_id, pk) {
            Some(previous) if previous != pk => {
                return Err(ProtocolViolation::AuditMismatch { author_id })
            }
            _ => {}
        }
    }
    Ok(authors)
}
