//! # Peer Actor
//!
//! One task per peer selects over three typed mailboxes and the shutdown
//! signal. Each request runs on its own task against the shared
//! [`PeerCore`]; a protocol violation there aborts the process.

use async_trait::async_trait;
use shared_bus::DEFAULT_CHANNEL_CAPACITY;
use shared_types::{abort, peer_name, Endorsement, PeerId, Transaction, TransactionProposal};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::domain::errors::PeerError;
use crate::ports::inbound::PeerApi;
use crate::service::PeerCore;

pub struct EndorseMessage {
    pub proposal: Arc<TransactionProposal>,
    pub reply: mpsc::Sender<Endorsement>,
}

pub struct OrderMessage {
    pub transaction: Transaction,
    pub commits: mpsc::Sender<PeerId>,
}

pub struct ValidateMessage {
    pub transaction: Arc<Transaction>,
    pub commits: mpsc::Sender<PeerId>,
}

/// Receiving side of a peer's mailboxes.
pub struct PeerMailbox {
    endorse: mpsc::Receiver<EndorseMessage>,
    order: mpsc::Receiver<OrderMessage>,
    validate: mpsc::Receiver<ValidateMessage>,
}

/// Sending side of a peer's mailboxes.
#[derive(Clone)]
pub struct PeerHandle {
    id: PeerId,
    endorse: mpsc::Sender<EndorseMessage>,
    order: mpsc::Sender<OrderMessage>,
    validate: mpsc::Sender<ValidateMessage>,
}

impl PeerHandle {
    pub fn id(&self) -> PeerId {
        self.id
    }
}

/// Mailboxes of peer `id`. Handles exist before the actor so the
/// directory can be built first.
pub fn peer_channel(id: PeerId) -> (PeerHandle, PeerMailbox) {
    let (endorse_tx, endorse_rx) = mpsc::channel(DEFAULT_CHANNEL_CAPACITY);
    let (order_tx, order_rx) = mpsc::channel(DEFAULT_CHANNEL_CAPACITY);
    let (validate_tx, validate_rx) = mpsc::channel(DEFAULT_CHANNEL_CAPACITY);
    (
        PeerHandle {
            id,
            endorse: endorse_tx,
            order: order_tx,
            validate: validate_tx,
        },
        PeerMailbox {
            endorse: endorse_rx,
            order: order_rx,
            validate: validate_rx,
        },
    )
}

#[async_trait]
impl PeerApi for PeerHandle {
    async fn submit_endorsement(
        &self,
        proposal: Arc<TransactionProposal>,
        reply: mpsc::Sender<Endorsement>,
    ) -> Result<(), PeerError> {
        self.endorse
            .send(EndorseMessage { proposal, reply })
            .await
            .map_err(|_| PeerError::Stopped(self.id))
    }

    async fn submit_order(
        &self,
        transaction: Transaction,
        commits: mpsc::Sender<PeerId>,
    ) -> Result<(), PeerError> {
        self.order
            .send(OrderMessage {
                transaction,
                commits,
            })
            .await
            .map_err(|_| PeerError::Stopped(self.id))
    }

    async fn submit_validation(
        &self,
        transaction: Arc<Transaction>,
        commits: mpsc::Sender<PeerId>,
    ) -> Result<(), PeerError> {
        self.validate
            .send(ValidateMessage {
                transaction,
                commits,
            })
            .await
            .map_err(|_| PeerError::Stopped(self.id))
    }
}

/// Actor loop state.
pub struct PeerActor {
    core: Arc<PeerCore>,
    mailbox: PeerMailbox,
    shutdown: watch::Receiver<bool>,
}

impl PeerActor {
    pub fn new(core: Arc<PeerCore>, mailbox: PeerMailbox, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            core,
            mailbox,
            shutdown,
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Run the actor loop until shutdown.
    pub async fn run(mut self) {
        let name = self.core.name();
        info!("[dl-03] {} started", name);

        loop {
            tokio::select! {
                Some(EndorseMessage { proposal, reply }) = self.mailbox.endorse.recv() => {
                    let core = self.core.clone();
                    tokio::spawn(async move {
                        match core.endorse(&proposal).await {
                            Ok(endorsement) => {
                                if reply.send(endorsement).await.is_err() {
                                    debug!("[dl-03] endorsement dropped, author gone");
                                }
                            }
                            Err(violation) => abort(&core.name(), violation),
                        }
                    });
                }
                Some(OrderMessage { transaction, commits }) = self.mailbox.order.recv() => {
                    let core = self.core.clone();
                    tokio::spawn(async move {
                        if let Err(violation) = core.order(transaction, commits).await {
                            abort(&core.name(), violation);
                        }
                    });
                }
                Some(ValidateMessage { transaction, commits }) = self.mailbox.validate.recv() => {
                    let core = self.core.clone();
                    tokio::spawn(async move {
                        if let Err(violation) = core.validate_and_commit(&transaction, &commits).await {
                            abort(&core.name(), violation);
                        }
                    });
                }
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("[dl-03] {} stopped", peer_name(self.core.id()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{peer_keys, PeerDirectory, PeerEntry};
    use crate::domain::fixtures::{Fixture, SEED};
    use shared_bus::{BandwidthSimulator, NetworkEventLog};
    use shared_crypto::schnorr;
    use shared_types::SimulationConfig;
    use sim_telemetry::SimulationRecorder;

    #[tokio::test]
    async fn test_endorse_order_validate_in_process() {
        let fixture = Fixture::new();
        let config = Arc::new(SimulationConfig {
            peers: 3,
            endorsements: 2,
            chaincode_delay_ms: 1,
            ..SimulationConfig::default()
        });
        let (handles, mailboxes): (Vec<_>, Vec<_>) = (0..3).map(peer_channel).unzip();
        let directory = Arc::new(PeerDirectory::new(
            handles
                .iter()
                .map(|handle| PeerEntry {
                    id: handle.id(),
                    public_key: peer_keys(SEED, handle.id()).pk,
                    api: Arc::new(handle.clone()) as Arc<dyn PeerApi>,
                })
                .collect(),
        ));
        let bandwidth = Arc::new(BandwidthSimulator::passthrough(Arc::new(NetworkEventLog::discard())));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let tasks: Vec<_> = mailboxes
            .into_iter()
            .enumerate()
            .map(|(id, mailbox)| {
                let id = id as PeerId;
                let core = PeerCore::new(
                    id,
                    peer_keys(SEED, id),
                    fixture.anchors(),
                    config.clone(),
                    directory.clone(),
                    bandwidth.clone(),
                    SimulationRecorder::new().unwrap(),
                );
                PeerActor::new(Arc::new(core), mailbox, shutdown_rx.clone()).spawn()
            })
            .collect();

        let (proposal, nym) = fixture.proposal("in process");
        let proposal_arc = Arc::new(proposal.clone());
        let (reply_tx, mut reply_rx) = mpsc::channel(2);
        for handle in &handles[1..] {
            handle
                .submit_endorsement(proposal_arc.clone(), reply_tx.clone())
                .await
                .unwrap();
        }
        let mut endorsements = Vec::new();
        for _ in 0..2 {
            let endorsement = reply_rx.recv().await.unwrap();
            let pk = directory.public_key(endorsement.endorser).unwrap();
            assert!(schnorr::verify(&pk, &endorsement.signature, &proposal.canonical_bytes()).is_ok());
            endorsements.push(endorsement);
        }

        let transaction = fixture.transaction(proposal, &nym, endorsements, 1);
        let (commits_tx, mut commits_rx) = mpsc::channel(3);
        handles[0].submit_order(transaction, commits_tx).await.unwrap();
        let mut committed = Vec::new();
        for _ in 0..3 {
            committed.push(commits_rx.recv().await.unwrap());
        }
        committed.sort_unstable();
        assert_eq!(committed, vec![0, 1, 2]);

        shutdown_tx.send(true).unwrap();
        for task in tasks {
            task.await.unwrap();
        }
        assert!(matches!(
            handles[0].submit_endorsement(proposal_arc, reply_tx).await,
            Err(PeerError::Stopped(0))
        ));
    }
}
