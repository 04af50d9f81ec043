//! # In-Process Network
//!
//! Builds the identity hierarchy, spawns every peer and the revocation
//! authority as actors, runs the users, audits the ledger and shuts
//! everything down.
//!
//! ## Construction
//!
//! 1. Root and auditor keys derive from the run seed
//! 2. Organizations enroll with the root, one task each
//! 3. Users enroll with their organization, one task each
//! 4. Peers and the revocation authority start
//!
//! Enrollment tasks draw their generators from a master generator seeded
//! with the run seed before any task starts, so identities do not depend
//! on completion order.

use anyhow::{anyhow, Context, Result};
use dl_01_issuance::{enroll, IssuerService};
use dl_02_revocation::{EpochCounter, RevocationActor, RevocationAuthority, RevocationService};
use dl_03_peer::{
    peer_channel, peer_keys, PeerActor, PeerApi, PeerCore, PeerDirectory, PeerEntry, TrustAnchors,
};
use dl_04_user::{ArrivalSchedule, UserAgent, UserContext};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared_bus::{BandwidthSimulator, NetworkEventLog};
use shared_crypto::{KeyPair, PublicParams};
use shared_types::{abort, Identity, PeerId, RoleTag, SimulationConfig, AUDITOR};
use sim_telemetry::{SimulationRecorder, SimulationReport};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tracing::info;

use crate::audit::audit_transactions;
use crate::ledger::Ledger;

/// Everything a simulation run owns.
pub struct Network {
    config: Arc<SimulationConfig>,
    params: PublicParams,
    auditor: KeyPair,
    organizations: Vec<Identity>,
    users: Vec<Identity>,
    peers: Arc<PeerDirectory>,
    peer_cores: Vec<Arc<PeerCore>>,
    revocation: Arc<RevocationService>,
    user_context: Arc<UserContext>,
    ledger: Arc<Ledger>,
    recorder: SimulationRecorder,
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl Network {
    /// Enroll every organization and user, then start peers and the
    /// revocation authority.
    pub async fn build(
        config: SimulationConfig,
        log: Arc<NetworkEventLog>,
        recorder: SimulationRecorder,
    ) -> Result<Self> {
        config.validate().context("invalid simulation configuration")?;
        let config = Arc::new(config);
        let seed = config.seed;
        let mut master = StdRng::seed_from_u64(seed);

        let (params, root_keys) = PublicParams::from_seed(seed);
        let auditor = KeyPair::derive(seed, AUDITOR, 0, 0);
        let bandwidth = Arc::new(BandwidthSimulator::new(
            config.bandwidth_local,
            config.bandwidth_global,
            log,
        ));
        info!("[runtime] root CA has been initialized");

        let root = Arc::new(IssuerService::new(
            Identity::root(root_keys),
            bandwidth.clone(),
            recorder.clone(),
        )?);
        let org_issuers: Vec<_> = (0..config.orgs as u64)
            .map(|id| (id, root.clone(), master.gen::<u64>()))
            .collect();
        let organizations =
            enroll_all(RoleTag::Organization, org_issuers, &params, &recorder).await?;
        info!("[runtime] all {} organizations have credentials", organizations.len());

        let mut org_services = Vec::with_capacity(organizations.len());
        for organization in &organizations {
            org_services.push(Arc::new(IssuerService::new(
                organization.clone(),
                bandwidth.clone(),
                recorder.clone(),
            )?));
        }
        let mut user_issuers = Vec::with_capacity(config.total_users());
        for (org, service) in org_services.iter().enumerate() {
            for user in 0..config.users {
                let id = (org * config.users + user) as u64;
                user_issuers.push((id, service.clone(), master.gen::<u64>()));
            }
        }
        let users = enroll_all(RoleTag::User, user_issuers, &params, &recorder).await?;
        info!("[runtime] all {} users have credentials", users.len());

        let (shutdown, shutdown_rx) = watch::channel(false);
        let authority = RevocationAuthority::from_seed(seed);
        let anchors = TrustAnchors {
            params: params.clone(),
            auditor_pk: auditor.pk,
            revocation_pk: authority.public_key(),
        };

        let (handles, mailboxes): (Vec<_>, Vec<_>) =
            (0..config.peers as PeerId).map(peer_channel).unzip();
        let peers = Arc::new(PeerDirectory::new(
            handles
                .iter()
                .map(|handle| PeerEntry {
                    id: handle.id(),
                    public_key: peer_keys(seed, handle.id()).pk,
                    api: Arc::new(handle.clone()) as Arc<dyn PeerApi>,
                })
                .collect(),
        ));
        let mut tasks = Vec::with_capacity(config.peers + 1);
        let mut peer_cores = Vec::with_capacity(config.peers);
        for (handle, mailbox) in handles.iter().zip(mailboxes) {
            let core = Arc::new(PeerCore::new(
                handle.id(),
                peer_keys(seed, handle.id()),
                anchors.clone(),
                config.clone(),
                peers.clone(),
                bandwidth.clone(),
                recorder.clone(),
            ));
            tasks.push(PeerActor::new(core.clone(), mailbox, shutdown_rx.clone()).spawn());
            peer_cores.push(core);
        }
        info!("[runtime] all {} peers have been spun up", peer_cores.len());

        let revocation = Arc::new(RevocationService::new(
            authority,
            EpochCounter::new(),
            config.concurrent_revocations,
            bandwidth,
            recorder.clone(),
        ));
        let (revocation_handle, revocation_task) = RevocationActor::spawn(
            revocation.clone(),
            config.epoch(),
            config.revoke,
            shutdown_rx,
        );
        tasks.push(revocation_task);

        let ledger = Arc::new(Ledger::new(config.total_transactions()));
        let user_context = Arc::new(UserContext {
            params: params.clone(),
            config: config.clone(),
            peers: peers.clone(),
            revocation: Arc::new(revocation_handle),
            auditor_pk: auditor.pk,
            ledger: ledger.clone(),
            recorder: recorder.clone(),
        });

        Ok(Self {
            config,
            params,
            auditor,
            organizations,
            users,
            peers,
            peer_cores,
            revocation,
            user_context,
            ledger,
            recorder,
            shutdown,
            tasks,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn params(&self) -> &PublicParams {
        &self.params
    }

    pub fn auditor(&self) -> &KeyPair {
        &self.auditor
    }

    /// Organizations, indexed by ID.
    pub fn organizations(&self) -> &[Identity] {
        &self.organizations
    }

    /// Users, indexed by ID.
    pub fn users(&self) -> &[Identity] {
        &self.users
    }

    pub fn peers(&self) -> &PeerDirectory {
        &self.peers
    }

    pub fn peer_cores(&self) -> &[Arc<PeerCore>] {
        &self.peer_cores
    }

    pub fn revocation(&self) -> &RevocationService {
        &self.revocation
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn recorder(&self) -> &SimulationRecorder {
        &self.recorder
    }

    /// Run every user to completion. Users submit concurrently.
    pub async fn run_users(&self) -> Result<()> {
        let mut running = JoinSet::new();
        for identity in &self.users {
            let agent = UserAgent::new(identity.clone(), self.user_context.clone());
            let schedule =
                ArrivalSchedule::new(self.config.frequency, self.config.seed ^ identity.id);
            let transactions = self.config.transactions;
            running.spawn(async move { agent.run(transactions, schedule).await.map(|_| ()) });
        }
        while let Some(joined) = running.join_next().await {
            joined.context("user task panicked")??;
        }
        Ok(())
    }

    /// Decrypt every committed transaction's audit encryption and match it
    /// against the author. A mismatch ends the process.
    pub fn audit(&self) -> usize {
        let transactions = self.ledger.transactions();
        info!("[runtime] audit started over {} transactions", transactions.len());
        let authors: HashMap<_, _> = self
            .users
            .iter()
            .map(|user| (user.id, user.keys.pk))
            .collect();
        match audit_transactions(&transactions, &self.auditor.sk, &authors, &self.recorder) {
            Ok(audited) => {
                info!("[runtime] audit completed");
                audited
            }
            Err(violation) => abort(AUDITOR, violation),
        }
    }

    /// Signal every peer and the revocation authority to exit and wait
    /// for them.
    pub async fn stop(self) -> Result<()> {
        self.shutdown
            .send(true)
            .map_err(|_| anyhow!("every actor already exited"))?;
        for task in self.tasks {
            task.await.context("actor task panicked")?;
        }
        info!("[runtime] all peers and the revocation authority have been shut down");
        Ok(())
    }
}

/// Enroll `(id, issuer, generator seed)` triples concurrently. The result is
/// sorted by ID whatever order the tasks finish in.
async fn enroll_all(
    role: RoleTag,
    requests: Vec<(u64, Arc<IssuerService>, u64)>,
    params: &PublicParams,
    recorder: &SimulationRecorder,
) -> Result<Vec<Identity>> {
    let mut enrolling = JoinSet::new();
    for (id, issuer, generator_seed) in requests {
        let params = params.clone();
        let recorder = recorder.clone();
        enrolling.spawn(async move {
            let mut rng = StdRng::seed_from_u64(generator_seed);
            enroll(&mut rng, issuer.as_ref(), role, id, &params, &recorder).await
        });
    }

    let mut identities = Vec::with_capacity(enrolling.len());
    while let Some(joined) = enrolling.join_next().await {
        let identity = joined
            .context("enrollment task panicked")?
            .with_context(|| format!("{role} enrollment failed"))?;
        identities.push(identity);
    }
    identities.sort_by_key(|identity| identity.id);
    Ok(identities)
}

/// Build a network from `config`, run it and return the report.
pub async fn simulate(config: SimulationConfig) -> Result<SimulationReport> {
    let log = match &config.network_log {
        Some(path) => Arc::new(
            NetworkEventLog::to_file(path)
                .with_context(|| format!("cannot open network log {}", path.display()))?,
        ),
        None => Arc::new(NetworkEventLog::discard()),
    };
    let recorder = SimulationRecorder::new()?;
    let start = Instant::now();

    let network = Network::build(config, log, recorder.clone()).await?;
    network.run_users().await?;
    if network.config().audit {
        network.audit();
    }
    let committed = network.ledger().len();
    network.stop().await?;

    let report = recorder.report(committed, start.elapsed());
    info!(
        "[runtime] simulation completed in {} seconds",
        report.elapsed.as_secs_f64().round()
    );
    Ok(report)
}
