//! # Distributed Roles
//!
//! One process per role, talking over the RPC bindings of the role crates.
//!
//! | Role | Kind | Serves / calls |
//! |------|------|----------------|
//! | `root` | server | `GetNonce`, `ProcessCredRequest` |
//! | `org` | server | enrolls with root, then `GetNonce`, `ProcessCredRequest` |
//! | `revocation` | server | `GetEpoch`, `GetPK`, `ProcessNRR`; epoch timer |
//! | `peer` | server | `Endorse`, `Order`, `Validate`, `Audit` |
//! | `user` | client | enrolls with its org, then runs its transactions |
//! | `auditor` | client | `Audit` on the first peer |
//!
//! Shared key material (public parameters, root, auditor, peers, revocation
//! authority) derives from the run seed, so no process distributes keys.
//! Transfers are logged but not delayed; the real network carries them.

use anyhow::{anyhow, Context, Result};
use dl_01_issuance::{enroll, IssuerRpcServer, IssuerService, RpcIssuerClient};
use dl_02_revocation::{
    run_epoch_timer, EpochCounter, RevocationAuthority, RevocationRpcServer, RevocationService,
    RpcRevocationClient,
};
use dl_03_peer::{
    peer_keys, PeerApi, PeerCore, PeerDirectory, PeerEntry, PeerRpcServer, RpcPeerClient,
    TrustAnchors,
};
use dl_04_user::{ArrivalSchedule, UserAgent, UserContext};
use rand::rngs::OsRng;
use shared_bus::{bind, serve, BandwidthSimulator, NetworkEventLog};
use shared_crypto::{KeyPair, PublicKey, PublicParams};
use shared_types::{abort, Identity, PeerId, RoleTag, SimulationConfig, UserId, AUDITOR};
use sim_telemetry::{SimulationRecorder, SimulationReport};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::audit::audit_records;
use crate::ledger::Ledger;

/// Listen address of a server role.
pub fn listen_address(config: &SimulationConfig) -> String {
    format!("0.0.0.0:{}", config.rpc_port)
}

/// Shutdown signal that turns true on Ctrl+C.
pub fn shutdown_on_ctrl_c() -> watch::Receiver<bool> {
    let (sender, receiver) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("[runtime] interrupt received, shutting down");
                if let Err(e) = sender.send(true) {
                    error!("[runtime] failed to send shutdown signal: {}", e);
                }
            }
            Err(e) => {
                warn!("[runtime] cannot listen for Ctrl+C: {}", e);
                // Keep the sender so servers run until killed.
                std::future::pending::<()>().await;
            }
        }
    });
    receiver
}

fn event_log(config: &SimulationConfig) -> Result<Arc<NetworkEventLog>> {
    Ok(Arc::new(match &config.network_log {
        Some(path) => NetworkEventLog::to_file(path)
            .with_context(|| format!("cannot open network log {}", path.display()))?,
        None => NetworkEventLog::discard(),
    }))
}

fn passthrough(config: &SimulationConfig) -> Result<Arc<BandwidthSimulator>> {
    Ok(Arc::new(BandwidthSimulator::passthrough(event_log(config)?)))
}

/// Remote peers by ID, in address order.
pub fn remote_peers(config: &SimulationConfig) -> Result<Arc<PeerDirectory>> {
    if config.peer_rpc_addresses.is_empty() {
        return Err(anyhow!("no peer RPC addresses configured"));
    }
    let entries = config
        .peer_rpc_addresses
        .iter()
        .enumerate()
        .map(|(id, address)| {
            let id = id as PeerId;
            PeerEntry {
                id,
                public_key: peer_keys(config.seed, id).pk,
                api: Arc::new(RpcPeerClient::new(id, address.clone())) as Arc<dyn PeerApi>,
            }
        })
        .collect();
    Ok(Arc::new(PeerDirectory::new(entries)))
}

/// Root authority on `listener`.
pub async fn serve_root(
    config: &SimulationConfig,
    listener: TcpListener,
    shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let (_, root_keys) = PublicParams::from_seed(config.seed);
    let service = IssuerService::new(
        Identity::root(root_keys),
        passthrough(config)?,
        SimulationRecorder::new()?,
    )?;
    info!("[runtime] running as ROOT");
    serve(listener, Arc::new(IssuerRpcServer::new(Arc::new(service))), shutdown).await;
    Ok(())
}

/// Organization `id`: enroll with the root, then serve users.
pub async fn serve_org(
    config: &SimulationConfig,
    id: u64,
    listener: TcpListener,
    shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let (params, _) = PublicParams::from_seed(config.seed);
    let recorder = SimulationRecorder::new()?;
    let root = RpcIssuerClient::new(config.root_rpc_address.clone());
    let identity = enroll(&mut OsRng, &root, RoleTag::Organization, id, &params, &recorder)
        .await
        .context("enrollment with the root failed")?;
    info!("[runtime] running as {}, received credentials", identity.name());

    let service = IssuerService::new(identity, passthrough(config)?, recorder)?;
    serve(listener, Arc::new(IssuerRpcServer::new(Arc::new(service))), shutdown).await;
    Ok(())
}

/// Revocation authority with its epoch timer.
pub async fn serve_revocation(
    config: &SimulationConfig,
    listener: TcpListener,
    shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let service = Arc::new(RevocationService::new(
        RevocationAuthority::from_seed(config.seed),
        EpochCounter::new(),
        config.concurrent_revocations,
        passthrough(config)?,
        SimulationRecorder::new()?,
    ));
    info!("[runtime] running as REVOCATION AUTHORITY");
    let timer = tokio::spawn(run_epoch_timer(
        service.epoch().clone(),
        config.epoch(),
        shutdown.clone(),
    ));
    serve(listener, Arc::new(RevocationRpcServer::new(service)), shutdown).await;
    timer.await.context("epoch timer panicked")?;
    Ok(())
}

/// Peer `id` of the configured peer set.
pub async fn serve_peer(
    config: Arc<SimulationConfig>,
    id: PeerId,
    listener: TcpListener,
    shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let peers = remote_peers(&config)?;
    if peers.get(id).is_none() {
        return Err(anyhow!("peer {id} has no configured RPC address"));
    }
    let (params, _) = PublicParams::from_seed(config.seed);
    let anchors = TrustAnchors {
        params,
        auditor_pk: KeyPair::derive(config.seed, AUDITOR, 0, 0).pk,
        revocation_pk: RevocationAuthority::from_seed(config.seed).public_key(),
    };
    let core = PeerCore::new(
        id,
        peer_keys(config.seed, id),
        anchors,
        config.clone(),
        peers,
        passthrough(&config)?,
        SimulationRecorder::new()?,
    );
    info!("[runtime] running as {}", core.name());
    serve(listener, Arc::new(PeerRpcServer::new(Arc::new(core))), shutdown).await;
    Ok(())
}

/// User `id`: enroll with the organization and run every transaction
/// against the remote peers.
pub async fn run_user(config: SimulationConfig, id: UserId) -> Result<SimulationReport> {
    let config = Arc::new(config);
    let (params, _) = PublicParams::from_seed(config.seed);
    let recorder = SimulationRecorder::new()?;
    let start = Instant::now();

    let organization = RpcIssuerClient::new(config.org_rpc_address.clone());
    let identity = enroll(&mut OsRng, &organization, RoleTag::User, id, &params, &recorder)
        .await
        .context("enrollment with the organization failed")?;
    info!("[runtime] {} received credentials", identity.name());

    let ledger = Arc::new(Ledger::new(config.transactions));
    let context = Arc::new(UserContext {
        params,
        config: config.clone(),
        peers: remote_peers(&config)?,
        revocation: Arc::new(RpcRevocationClient::new(config.revocation_rpc_address.clone())),
        auditor_pk: KeyPair::derive(config.seed, AUDITOR, 0, 0).pk,
        ledger: ledger.clone(),
        recorder: recorder.clone(),
    });
    let schedule = ArrivalSchedule::new(config.frequency, config.seed ^ id);
    UserAgent::new(identity, context)
        .run(config.transactions, schedule)
        .await?;

    Ok(recorder.report(ledger.len(), start.elapsed()))
}

/// Fetch the first peer's audit records and decrypt them. Returns the
/// public key of every author seen.
pub async fn run_auditor(config: &SimulationConfig) -> Result<HashMap<UserId, PublicKey>> {
    let address = config
        .peer_rpc_addresses
        .first()
        .ok_or_else(|| anyhow!("no peer RPC addresses configured"))?;
    let auditor = KeyPair::derive(config.seed, AUDITOR, 0, 0);
    let records = RpcPeerClient::new(0, address.clone())
        .audit()
        .await
        .context("Audit call failed")?;
    info!("[runtime] audit started over {} records", records.len());

    let recorder = SimulationRecorder::new()?;
    match audit_records(&records, &auditor.sk, &recorder) {
        Ok(authors) => {
            info!("[runtime] audit completed for {} authors", authors.len());
            Ok(authors)
        }
        Err(violation) => abort(AUDITOR, violation),
    }
}

/// Bind the role's port and serve until Ctrl+C.
pub async fn bind_role(config: &SimulationConfig) -> Result<(TcpListener, watch::Receiver<bool>)> {
    let listener = bind(&listen_address(config)).await?;
    Ok((listener, shutdown_on_ctrl_c()))
}
