//! # User Service
//!
//! One user's transaction life-cycle: route, collect endorsements, refresh
//! the non-revocation handle when the epoch moved, assemble, order, and
//! wait until every peer has committed.

use dl_02_revocation::{verify_handle, RevocationApi};
use dl_03_peer::domain::checks::check_endorsement;
use dl_03_peer::PeerDirectory;
use rand::rngs::OsRng;
use shared_crypto::{sha3_256, PublicKey, PublicParams};
use shared_types::{
    abort, Endorsement, Identity, NonRevocationHandle, NonRevocationRequest, PeerId,
    SimulationConfig, TransactionProposal,
};
use sim_telemetry::{CryptoEvent, SimulationRecorder, TransactionTiming};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::domain::arrivals::{random_message, ArrivalSchedule};
use crate::domain::assembly::{assemble_transaction, build_proposal, Attachments};
use crate::domain::errors::UserError;
use crate::domain::routing;
use crate::ports::outbound::CommitLedger;

/// What every user of a network shares.
pub struct UserContext {
    pub params: PublicParams,
    pub config: Arc<SimulationConfig>,
    pub peers: Arc<PeerDirectory>,
    pub revocation: Arc<dyn RevocationApi>,
    pub auditor_pk: PublicKey,
    pub ledger: Arc<dyn CommitLedger>,
    pub recorder: SimulationRecorder,
}

/// A user and its cached non-revocation handle.
pub struct UserAgent {
    identity: Identity,
    context: Arc<UserContext>,
    non_revocation: Option<NonRevocationHandle>,
}

impl UserAgent {
    pub fn new(identity: Identity, context: Arc<UserContext>) -> Self {
        Self {
            identity,
            context,
            non_revocation: None,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn name(&self) -> String {
        self.identity.name()
    }

    /// Epoch of the cached handle.
    pub fn epoch(&self) -> Option<u64> {
        self.non_revocation.as_ref().map(|handle| handle.epoch)
    }

    /// Fetch, verify and cache a handle for the authority's current epoch.
    pub async fn request_non_revocation(&mut self) -> Result<u64, UserError> {
        let revocation = &self.context.revocation;
        let request = NonRevocationRequest {
            user_id: self.identity.id,
            user_pk: self.identity.keys.pk,
        };
        let handle = revocation.request_handle(request).await?;
        let authority_pk = revocation.public_key().await?;

        verify_handle(&handle, &authority_pk, &self.identity.keys.pk)?;
        self.context.recorder.record(CryptoEvent::NonRevokeVerify);

        let epoch = handle.epoch;
        self.non_revocation = Some(handle);
        Ok(epoch)
    }

    /// Request a new handle if the cached one is not for the current epoch.
    /// Returns whether a request was made.
    pub async fn refresh_if_stale(&mut self) -> Result<bool, UserError> {
        let current = self.context.revocation.current_epoch().await?;
        if self.epoch() == Some(current) {
            return Ok(false);
        }
        debug!(
            "[dl-04] {} detected epoch change ({:?} -> {}), requesting new handle",
            self.name(),
            self.epoch(),
            current
        );
        self.request_non_revocation().await?;
        Ok(true)
    }

    /// Submit `message` and wait until every peer has committed it.
    pub async fn submit_transaction(&mut self, message: &str) -> Result<TransactionTiming, UserError> {
        let context = self.context.clone();
        let config = &context.config;
        let recorder = &context.recorder;
        let peers = context.peers.len();

        info!("[dl-04] {} starts transaction with message {}", self.name(), message);
        let mut timing = TransactionTiming::started_at(Instant::now());

        let hash = sha3_256(message.as_bytes());
        recorder.record(CryptoEvent::Hash);
        let endorsers = routing::endorsers(message, peers, config.endorsements);
        recorder.record(CryptoEvent::Hash);

        let (proposal, nym) =
            build_proposal(&mut OsRng, &self.identity, &context.params, hash, recorder)?;
        let proposal = Arc::new(proposal);

        timing.endorsements_start = Instant::now();
        let (reply_tx, mut reply_rx) = mpsc::channel(config.endorsements.max(1));
        for &position in &endorsers {
            let peer = context.peers.at(position).ok_or(UserError::NoPeer(position))?;
            peer.api
                .submit_endorsement(proposal.clone(), reply_tx.clone())
                .await?;
        }
        drop(reply_tx);
        let endorsements = self.collect_endorsements(&mut reply_rx, &proposal).await?;
        timing.endorsements_end = Instant::now();
        debug!("[dl-04] {} has all {} endorsements", self.name(), endorsements.len());

        if config.revoke {
            self.refresh_if_stale().await?;
        }

        let proposal = Arc::try_unwrap(proposal).unwrap_or_else(|shared| (*shared).clone());
        let attachments = Attachments {
            non_revocation: if config.revoke {
                self.non_revocation
                    .as_ref()
                    .map(|handle| (&handle.handle, handle.epoch))
            } else {
                None
            },
            auditor_pk: config.audit.then_some(&context.auditor_pk),
        };
        let mut transaction = assemble_transaction(
            &mut OsRng,
            &self.identity,
            &context.params,
            &nym,
            proposal,
            endorsements,
            attachments,
            recorder,
        );

        let position = routing::orderer(message, peers);
        recorder.record(CryptoEvent::Hash);
        let orderer = context.peers.at(position).ok_or(UserError::NoPeer(position))?;

        timing.validation_start = Instant::now();
        let (commits_tx, mut commits_rx) = mpsc::channel(peers.max(1));
        orderer.api.submit_order(transaction.clone(), commits_tx).await?;
        wait_for_commits(&mut commits_rx, peers).await?;
        timing.validation_end = Instant::now();
        transaction.orderer = Some(orderer.id);
        timing.end = timing.validation_end;

        recorder.timings.record(timing);
        context.ledger.record(transaction);
        info!("[dl-04] {} transaction completed", self.name());
        Ok(timing)
    }

    /// Receive one endorsement per selected peer, checking each against the
    /// endorser's known key.
    async fn collect_endorsements(
        &self,
        replies: &mut mpsc::Receiver<Endorsement>,
        proposal: &TransactionProposal,
    ) -> Result<Vec<Endorsement>, UserError> {
        let need = self.context.config.endorsements;
        let mut endorsements = Vec::with_capacity(need);
        while endorsements.len() < need {
            let Some(endorsement) = replies.recv().await else {
                return Err(UserError::EndorsementsLost {
                    got: endorsements.len(),
                    need,
                });
            };
            let endorser_pk = self.context.peers.public_key(endorsement.endorser);
            check_endorsement(&endorsement, proposal, endorser_pk, &self.context.recorder)?;
            endorsements.push(endorsement);
        }
        Ok(endorsements)
    }

    /// Submit `transactions` random messages on `schedule`. The first handle
    /// is fetched up front when revocation is on. Protocol violations end
    /// the process.
    pub async fn run(
        mut self,
        transactions: usize,
        mut schedule: ArrivalSchedule,
    ) -> Result<Self, UserError> {
        let name = self.name();
        if self.context.config.revoke && self.non_revocation.is_none() {
            self.request_non_revocation()
                .await
                .map_err(|e| escalate(&name, e))?;
        }

        tokio::time::sleep(schedule.initial_delay()).await;
        for _ in 0..transactions {
            tokio::time::sleep(schedule.next_delay()).await;
            let message = random_message(&mut rand::thread_rng());
            self.submit_transaction(&message)
                .await
                .map_err(|e| escalate(&name, e))?;
        }
        debug!("[dl-04] {} submitted all {} transactions", name, transactions);
        Ok(self)
    }
}

/// Abort on a protocol violation, pass anything else through.
fn escalate(context: &str, error: UserError) -> UserError {
    match error {
        UserError::Violation(violation) => abort(context, violation),
        other => other,
    }
}

/// Block until `peers` commit signals have arrived. There is no timeout;
/// a missing signal stalls the caller.
pub async fn wait_for_commits(
    commits: &mut mpsc::Receiver<PeerId>,
    peers: usize,
) -> Result<Vec<PeerId>, UserError> {
    let mut committed = Vec::with_capacity(peers);
    while committed.len() < peers {
        match commits.recv().await {
            Some(id) => committed.push(id),
            None => {
                return Err(UserError::CommitsLost {
                    got: committed.len(),
                    need: peers,
                })
            }
        }
    }
    Ok(committed)
}
