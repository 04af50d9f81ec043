//! Test network: in-process peer actors, a revocation actor and a user
//! identity chained to the seed's root key.

use dl_01_issuance::attributes_for;
use dl_02_revocation::{EpochCounter, RevocationActor, RevocationAuthority, RevocationService};
use dl_03_peer::{
    peer_channel, peer_keys, PeerActor, PeerApi, PeerCore, PeerDirectory, PeerEntry, TrustAnchors,
};
use parking_lot::Mutex;
use rand::rngs::OsRng;
use shared_bus::{BandwidthSimulator, NetworkEventLog};
use shared_crypto::{Credentials, KeyPair, PublicParams};
use shared_types::{Identity, PeerId, RoleTag, SimulationConfig, Transaction, AUDITOR};
use sim_telemetry::SimulationRecorder;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::ports::outbound::CommitLedger;
use crate::service::UserContext;

/// User `id` of organization 0, delegated root → org → user.
pub fn user_identity(seed: u64, id: u64) -> (PublicParams, Identity) {
    let (params, root) = PublicParams::from_seed(seed);
    let org = KeyPair::derive(seed, "org", 0, 1);
    let keys = KeyPair::derive(seed, "user", id, 2);
    let mut credentials = Credentials::new(root.pk);
    credentials
        .delegate(&mut OsRng, &root.sk, org.pk, attributes_for(RoleTag::Organization, 0))
        .unwrap();
    credentials
        .delegate(&mut OsRng, &org.sk, keys.pk, attributes_for(RoleTag::User, id))
        .unwrap();
    let identity = Identity {
        keys,
        credentials,
        id,
        role: RoleTag::User,
    };
    (params, identity)
}

#[derive(Default)]
pub struct MemoryLedger {
    pub transactions: Mutex<Vec<Transaction>>,
}

impl CommitLedger for MemoryLedger {
    fn record(&self, transaction: Transaction) {
        self.transactions.lock().push(transaction);
    }
}

pub struct TestNetwork {
    pub context: Arc<UserContext>,
    pub ledger: Arc<MemoryLedger>,
    pub revocation: Arc<RevocationService>,
    pub auditor: KeyPair,
    pub recorder: SimulationRecorder,
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl TestNetwork {
    pub fn start(seed: u64, config: SimulationConfig) -> Self {
        let config = Arc::new(config);
        let (params, _) = PublicParams::from_seed(seed);
        let recorder = SimulationRecorder::new().unwrap();
        let bandwidth = Arc::new(BandwidthSimulator::passthrough(Arc::new(NetworkEventLog::discard())));
        let auditor = KeyPair::derive(seed, AUDITOR, 0, 0);
        let authority = RevocationAuthority::from_seed(seed);
        let anchors = TrustAnchors {
            params: params.clone(),
            auditor_pk: auditor.pk,
            revocation_pk: authority.public_key(),
        };
        let (shutdown, shutdown_rx) = watch::channel(false);

        let (handles, mailboxes): (Vec<_>, Vec<_>) =
            (0..config.peers as PeerId).map(peer_channel).unzip();
        let directory = Arc::new(PeerDirectory::new(
            handles
                .iter()
                .map(|handle| PeerEntry {
                    id: handle.id(),
                    public_key: peer_keys(seed, handle.id()).pk,
                    api: Arc::new(handle.clone()) as Arc<dyn PeerApi>,
                })
                .collect(),
        ));
        let mut tasks: Vec<_> = mailboxes
            .into_iter()
            .zip(handles.iter().map(|handle| handle.id()))
            .map(|(mailbox, id)| {
                let core = PeerCore::new(
                    id,
                    peer_keys(seed, id),
                    anchors.clone(),
                    config.clone(),
                    directory.clone(),
                    bandwidth.clone(),
                    recorder.clone(),
                );
                PeerActor::new(Arc::new(core), mailbox, shutdown_rx.clone()).spawn()
            })
            .collect();

        let revocation = Arc::new(RevocationService::new(
            authority,
            EpochCounter::new(),
            config.concurrent_revocations,
            bandwidth,
            recorder.clone(),
        ));
        // Epochs only move when a test advances them.
        let (revocation_handle, revocation_task) = RevocationActor::spawn(
            revocation.clone(),
            Duration::from_secs(3600),
            false,
            shutdown_rx,
        );
        tasks.push(revocation_task);

        let ledger = Arc::new(MemoryLedger::default());
        let context = Arc::new(UserContext {
            params,
            config,
            peers: directory,
            revocation: Arc::new(revocation_handle),
            auditor_pk: auditor.pk,
            ledger: ledger.clone(),
            recorder: recorder.clone(),
        });

        Self {
            context,
            ledger,
            revocation,
            auditor,
            recorder,
            shutdown,
            tasks,
        }
    }

    pub async fn stop(self) {
        self.shutdown.send(true).unwrap();
        for task in self.tasks {
            task.await.unwrap();
        }
    }
}
