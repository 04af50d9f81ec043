//! # Peer Core
//!
//! The endorse / order / validate protocol, written once and driven by both
//! bindings. Endorsement and validation each hold a permit of their own
//! limiter for the whole check; ordering is unbounded.

use parking_lot::Mutex;
use rand::rngs::OsRng;
use shared_bus::BandwidthSimulator;
use shared_crypto::{schnorr, KeyPair, PublicKey};
use shared_types::{
    peer_name, user_name, AuditRecord, Endorsement, Operation, PeerId, ProtocolViolation,
    SimulationConfig, Transaction, TransactionProposal,
};
use sim_telemetry::{CryptoEvent, SimulationRecorder};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, warn};

use crate::directory::PeerDirectory;
use crate::domain::cache::ProofCache;
use crate::domain::checks::{
    check_audit, check_endorsements, check_identity, check_non_revocation, check_proposal_signature,
    check_quorum, check_transaction_signature, TrustAnchors,
};

/// State and protocol of one peer.
pub struct PeerCore {
    id: PeerId,
    keys: KeyPair,
    anchors: TrustAnchors,
    config: Arc<SimulationConfig>,
    cache: ProofCache,
    endorsements: Semaphore,
    validations: Semaphore,
    directory: Arc<PeerDirectory>,
    bandwidth: Arc<BandwidthSimulator>,
    recorder: SimulationRecorder,
    audit_records: Mutex<Vec<AuditRecord>>,
}

impl PeerCore {
    pub fn new(
        id: PeerId,
        keys: KeyPair,
        anchors: TrustAnchors,
        config: Arc<SimulationConfig>,
        directory: Arc<PeerDirectory>,
        bandwidth: Arc<BandwidthSimulator>,
        recorder: SimulationRecorder,
    ) -> Self {
        Self {
            id,
            keys,
            anchors,
            endorsements: Semaphore::new(config.concurrent_endorsements),
            validations: Semaphore::new(config.concurrent_validations),
            config,
            cache: ProofCache::new(),
            directory,
            bandwidth,
            recorder,
            audit_records: Mutex::new(Vec::new()),
        }
    }

    pub fn id(&self) -> PeerId {
        self.id
    }

    pub fn name(&self) -> String {
        peer_name(self.id)
    }

    pub fn public_key(&self) -> PublicKey {
        self.keys.pk
    }

    pub fn directory(&self) -> &PeerDirectory {
        &self.directory
    }

    pub fn cache(&self) -> &ProofCache {
        &self.cache
    }

    /// Audit material of every transaction this peer validated.
    pub fn audit_records(&self) -> Vec<AuditRecord> {
        self.audit_records.lock().clone()
    }

    /// Check and sign `proposal`.
    pub async fn endorse(&self, proposal: &TransactionProposal) -> Result<Endorsement, ProtocolViolation> {
        let author = user_name(proposal.author_id);
        let me = self.name();
        self.bandwidth.record_transfer(&author, &me, proposal).await;

        let endorsement = {
            let _permit = self.endorsements.acquire().await.ok();
            let params = &self.anchors.params;
            check_proposal_signature(proposal, params, Operation::Endorsement, &self.recorder)?;
            // Author check, then read/write permission; the second is a cache hit.
            for _ in 0..2 {
                check_identity(proposal, params, &self.cache, Operation::Endorsement, &self.recorder)?;
            }
            tokio::time::sleep(self.config.chaincode_delay()).await;

            self.recorder.record(CryptoEvent::SignSchnorr);
            Endorsement {
                signature: schnorr::sign(&mut OsRng, &self.keys.sk, &proposal.canonical_bytes()),
                endorser: self.id,
            }
        };

        self.bandwidth.record_transfer(&me, &author, &endorsement).await;
        debug!("[dl-03] {} endorsed a proposal of {}", me, author);
        Ok(endorsement)
    }

    /// Stamp `transaction` with this peer as orderer and hand it to every
    /// peer for validation.
    pub async fn order(
        &self,
        mut transaction: Transaction,
        commits: mpsc::Sender<PeerId>,
    ) -> Result<(), ProtocolViolation> {
        let me = self.name();
        self.bandwidth
            .record_transfer(&user_name(transaction.proposal.author_id), &me, &transaction)
            .await;

        check_identity(
            &transaction.proposal,
            &self.anchors.params,
            &self.cache,
            Operation::Ordering,
            &self.recorder,
        )?;
        if let Some(orderer) = transaction.orderer {
            return Err(ProtocolViolation::AlreadyOrdered(orderer));
        }
        transaction.orderer = Some(self.id);

        let transaction = Arc::new(transaction);
        for peer in self.directory.iter() {
            peer.api
                .submit_validation(transaction.clone(), commits.clone())
                .await
                .map_err(|e| ProtocolViolation::Unreachable(e.to_string()))?;
        }
        debug!("[dl-03] {} broadcast a transaction to {} peers", me, self.directory.len());
        Ok(())
    }

    /// Run every validation check on `transaction`.
    pub async fn validate(&self, transaction: &Transaction) -> Result<(), ProtocolViolation> {
        let me = self.name();
        // The orderer already holds its own copy.
        if let Some(orderer) = transaction.orderer.filter(|orderer| *orderer != self.id) {
            self.bandwidth
                .record_transfer(&peer_name(orderer), &me, transaction)
                .await;
        }

        let _permit = self.validations.acquire().await.ok();
        let params = &self.anchors.params;
        let proposal = &transaction.proposal;

        check_transaction_signature(transaction, params, &self.recorder)?;
        check_quorum(transaction, self.config.endorsements)?;
        check_endorsements(transaction, |id| self.directory.public_key(id), &self.recorder)?;
        check_identity(proposal, params, &self.cache, Operation::Validation, &self.recorder)?;
        if self.config.audit {
            check_audit(transaction, &self.anchors, &self.recorder)?;
        }
        if self.config.revoke {
            check_non_revocation(transaction, &self.anchors, &self.recorder)?;
        }
        tokio::time::sleep(self.config.chaincode_delay()).await;

        if let Some(audit) = &transaction.audit {
            self.audit_records.lock().push(AuditRecord {
                author_id: proposal.author_id,
                encryption: audit.encryption,
            });
        }
        Ok(())
    }

    /// Validate, then signal this peer's ID on `commits`.
    pub async fn validate_and_commit(
        &self,
        transaction: &Transaction,
        commits: &mpsc::Sender<PeerId>,
    ) -> Result<(), ProtocolViolation> {
        self.validate(transaction).await?;
        if commits.send(self.id).await.is_err() {
            warn!("[dl-03] {} validated a transaction nobody waits for", self.name());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{peer_keys, PeerEntry};
    use crate::domain::fixtures::{Fixture, SEED};
    use crate::ports::inbound::PeerApi;
    use crate::domain::errors::PeerError;
    use async_trait::async_trait;
    use shared_bus::NetworkEventLog;

    /// Peer stand-in that counts validation requests and commits at once.
    struct Recording {
        id: PeerId,
        validations: Mutex<usize>,
    }

    #[async_trait]
    impl PeerApi for Recording {
        async fn submit_endorsement(
            &self,
            _proposal: Arc<TransactionProposal>,
            _reply: mpsc::Sender<Endorsement>,
        ) -> Result<(), PeerError> {
            Ok(())
        }

        async fn submit_order(
            &self,
            _transaction: Transaction,
            _commits: mpsc::Sender<PeerId>,
        ) -> Result<(), PeerError> {
            Ok(())
        }

        async fn submit_validation(
            &self,
            transaction: Arc<Transaction>,
            commits: mpsc::Sender<PeerId>,
        ) -> Result<(), PeerError> {
            assert!(transaction.orderer.is_some());
            *self.validations.lock() += 1;
            commits.send(self.id).await.ok();
            Ok(())
        }
    }

    fn config() -> Arc<SimulationConfig> {
        Arc::new(SimulationConfig {
            peers: 3,
            endorsements: 2,
            chaincode_delay_ms: 0,
            ..SimulationConfig::default()
        })
    }

    fn core(fixture: &Fixture, id: PeerId, directory: Arc<PeerDirectory>) -> PeerCore {
        let bandwidth = BandwidthSimulator::passthrough(Arc::new(NetworkEventLog::discard()));
        core_with_bandwidth(fixture, id, directory, Arc::new(bandwidth))
    }

    fn core_with_bandwidth(
        fixture: &Fixture,
        id: PeerId,
        directory: Arc<PeerDirectory>,
        bandwidth: Arc<BandwidthSimulator>,
    ) -> PeerCore {
        PeerCore::new(
            id,
            peer_keys(SEED, id),
            fixture.anchors(),
            config(),
            directory,
            bandwidth,
            SimulationRecorder::new().unwrap(),
        )
    }

    fn endorsed_transaction(fixture: &Fixture, message: &str) -> Transaction {
        let (proposal, nym) = fixture.proposal(message);
        let endorsements = vec![
            fixture.endorse(&peer_keys(SEED, 1), 1, &proposal),
            fixture.endorse(&peer_keys(SEED, 2), 2, &proposal),
        ];
        fixture.transaction(proposal, &nym, endorsements, 3)
    }

    fn recording_directory() -> (Arc<PeerDirectory>, Vec<Arc<Recording>>) {
        let peers: Vec<Arc<Recording>> = (0..3)
            .map(|id| {
                Arc::new(Recording {
                    id,
                    validations: Mutex::new(0),
                })
            })
            .collect();
        let entries = peers
            .iter()
            .map(|peer| PeerEntry {
                id: peer.id,
                public_key: peer_keys(SEED, peer.id).pk,
                api: peer.clone() as Arc<dyn PeerApi>,
            })
            .collect();
        (Arc::new(PeerDirectory::new(entries)), peers)
    }

    #[tokio::test]
    async fn test_endorsement_verifies_under_peer_key() {
        let fixture = Fixture::new();
        let (directory, _) = recording_directory();
        let peer = core(&fixture, 1, directory);
        let (proposal, _) = fixture.proposal("hello");

        let endorsement = peer.endorse(&proposal).await.unwrap();

        assert_eq!(endorsement.endorser, 1);
        assert!(schnorr::verify(
            &peer_keys(SEED, 1).pk,
            &endorsement.signature,
            &proposal.canonical_bytes()
        )
        .is_ok());
        // Two identity checks, one verification.
        assert_eq!(peer.recorder.crypto.count(CryptoEvent::CredVerify), 1);
        assert_eq!(peer.cache().len(Operation::Endorsement), 1);
    }

    #[tokio::test]
    async fn test_identity_cache_is_idempotent() {
        let fixture = Fixture::new();
        let (directory, _) = recording_directory();
        let peer = core(&fixture, 0, directory);
        let (proposal, _) = fixture.proposal("cached");
        let params = &fixture.params;

        let first = check_identity(&proposal, params, peer.cache(), Operation::Validation, &peer.recorder);
        let second = check_identity(&proposal, params, peer.cache(), Operation::Validation, &peer.recorder);

        assert_eq!(first, Ok(true));
        assert_eq!(second, Ok(false));
        assert_eq!(peer.recorder.crypto.count(CryptoEvent::CredVerify), 1);
        // The cache key is hashed on every lookup.
        assert_eq!(peer.recorder.crypto.count(CryptoEvent::Hash), 2);

        // Ordering has its own partition.
        let ordering = check_identity(&proposal, params, peer.cache(), Operation::Ordering, &peer.recorder);
        assert_eq!(ordering, Ok(true));
        assert_eq!(peer.recorder.crypto.count(CryptoEvent::CredVerify), 2);
    }

    #[tokio::test]
    async fn test_tampered_proposal_rejected() {
        let fixture = Fixture::new();
        let (directory, _) = recording_directory();
        let peer = core(&fixture, 0, directory);
        let (mut proposal, _) = fixture.proposal("tampered");
        proposal.author_id = 5;

        assert_eq!(
            peer.endorse(&proposal).await,
            Err(ProtocolViolation::InvalidNymSignature {
                operation: Operation::Endorsement
            })
        );
    }

    #[tokio::test]
    async fn test_order_stamps_and_broadcasts_to_all() {
        let fixture = Fixture::new();
        let (directory, peers) = recording_directory();
        let orderer = core(&fixture, 2, directory);
        let (proposal, nym) = fixture.proposal("order me");
        let transaction = fixture.transaction(proposal, &nym, vec![], 1);
        let (commits_tx, mut commits_rx) = mpsc::channel(8);

        orderer.order(transaction, commits_tx).await.unwrap();

        let mut committed = Vec::new();
        while let Some(id) = commits_rx.recv().await {
            committed.push(id);
        }
        committed.sort_unstable();
        assert_eq!(committed, vec![0, 1, 2]);
        assert!(peers.iter().all(|peer| *peer.validations.lock() == 1));
    }

    #[tokio::test]
    async fn test_order_only_once() {
        let fixture = Fixture::new();
        let (directory, _) = recording_directory();
        let orderer = core(&fixture, 0, directory);
        let (proposal, nym) = fixture.proposal("twice");
        let mut transaction = fixture.transaction(proposal, &nym, vec![], 1);
        transaction.orderer = Some(1);
        let (commits_tx, _commits_rx) = mpsc::channel(8);

        assert_eq!(
            orderer.order(transaction, commits_tx).await,
            Err(ProtocolViolation::AlreadyOrdered(1))
        );
    }

    #[tokio::test]
    async fn test_validation_accepts_full_transaction() {
        let fixture = Fixture::new();
        let (directory, _) = recording_directory();
        let peer = core(&fixture, 0, directory);
        let (proposal, nym) = fixture.proposal("valid");
        let endorsements = vec![
            fixture.endorse(&peer_keys(SEED, 1), 1, &proposal),
            fixture.endorse(&peer_keys(SEED, 2), 2, &proposal),
        ];
        let mut transaction = fixture.transaction(proposal, &nym, endorsements, 3);
        transaction.orderer = Some(1);
        let (commits_tx, mut commits_rx) = mpsc::channel(1);

        peer.validate_and_commit(&transaction, &commits_tx).await.unwrap();

        assert_eq!(commits_rx.recv().await, Some(0));
        // Both endorsements are checked as one batch.
        assert_eq!(peer.recorder.crypto.count(CryptoEvent::VerifySchnorr), 1);
        let records = peer.audit_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].encryption.decrypt(&fixture.auditor.sk), fixture.user.pk);
    }

    #[tokio::test]
    async fn test_validation_rejects_short_quorum() {
        let fixture = Fixture::new();
        let (directory, _) = recording_directory();
        let peer = core(&fixture, 0, directory);
        let (proposal, nym) = fixture.proposal("short");
        let endorsements = vec![fixture.endorse(&peer_keys(SEED, 1), 1, &proposal)];
        let transaction = fixture.transaction(proposal, &nym, endorsements, 1);

        assert_eq!(
            peer.validate(&transaction).await,
            Err(ProtocolViolation::TooFewEndorsements { got: 1, need: 2 })
        );
    }

    #[tokio::test]
    async fn test_validation_rejects_forged_endorsement() {
        let fixture = Fixture::new();
        let (directory, _) = recording_directory();
        let peer = core(&fixture, 0, directory);
        let (proposal, nym) = fixture.proposal("forged");
        let endorsements = vec![
            fixture.endorse(&peer_keys(SEED, 1), 1, &proposal),
            // Signed by peer 1, claimed by peer 2.
            fixture.endorse(&peer_keys(SEED, 1), 2, &proposal),
        ];
        let transaction = fixture.transaction(proposal, &nym, endorsements, 1);

        assert_eq!(
            peer.validate(&transaction).await,
            Err(ProtocolViolation::InvalidEndorsement { endorser: 2 })
        );
    }

    #[tokio::test]
    async fn test_validation_rejects_stale_epoch() {
        let fixture = Fixture::new();
        let (directory, _) = recording_directory();
        let peer = core(&fixture, 0, directory);
        let (proposal, nym) = fixture.proposal("stale");
        let endorsements = vec![
            fixture.endorse(&peer_keys(SEED, 0), 0, &proposal),
            fixture.endorse(&peer_keys(SEED, 1), 1, &proposal),
        ];
        let mut transaction = fixture.transaction(proposal, &nym, endorsements, 1);
        transaction.epoch = 2;

        assert!(matches!(
            peer.validate(&transaction).await,
            Err(ProtocolViolation::InvalidNonRevocation(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_orderer_validates_its_own_copy_for_free() {
        let fixture = Fixture::new();
        let (directory, _) = recording_directory();
        let log = Arc::new(NetworkEventLog::in_memory());
        let slow = Arc::new(BandwidthSimulator::new(1000, 1000, log.clone()));
        let peer = core_with_bandwidth(&fixture, 0, directory, slow);
        let mut transaction = endorsed_transaction(&fixture, "self ordered");
        transaction.orderer = Some(0);

        let started = tokio::time::Instant::now();
        peer.validate(&transaction).await.unwrap();

        assert!(log.is_empty());
        assert_eq!(started.elapsed(), std::time::Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_validation_bills_transfer_from_orderer() {
        let fixture = Fixture::new();
        let (directory, _) = recording_directory();
        let log = Arc::new(NetworkEventLog::in_memory());
        let slow = Arc::new(BandwidthSimulator::new(1000, 1000, log.clone()));
        let peer = core_with_bandwidth(&fixture, 0, directory, slow);
        let mut transaction = endorsed_transaction(&fixture, "ordered elsewhere");
        transaction.orderer = Some(1);

        let started = tokio::time::Instant::now();
        peer.validate(&transaction).await.unwrap();

        assert_eq!(log.len(), 1);
        assert!(log.lines()[0].contains("peer-1"));
        assert!(started.elapsed() > std::time::Duration::ZERO);
    }
}
