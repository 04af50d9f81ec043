//! Every role on loopback, talking RPC.

#![allow(clippy::unwrap_used)]

use node_runtime::distributed::{
    run_auditor, run_user, serve_org, serve_peer, serve_revocation, serve_root,
};
use shared_bus::bind;
use shared_types::{SimulationConfig, MIB};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;

async fn loopback() -> (TcpListener, String) {
    let listener = bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    (listener, address)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_user_and_auditor_over_rpc() {
    let (root_listener, root_address) = loopback().await;
    let (org_listener, org_address) = loopback().await;
    let (revocation_listener, revocation_address) = loopback().await;
    let mut peer_listeners = Vec::new();
    let mut peer_addresses = Vec::new();
    for _ in 0..3 {
        let (listener, address) = loopback().await;
        peer_listeners.push(listener);
        peer_addresses.push(address);
    }

    let config = SimulationConfig {
        orgs: 1,
        users: 1,
        peers: 3,
        endorsements: 2,
        transactions: 2,
        chaincode_delay_ms: 0,
        bandwidth_global: 1024 * MIB,
        bandwidth_local: 1024 * MIB,
        seed: 11,
        root_rpc_address: root_address,
        org_rpc_address: org_address,
        revocation_rpc_address: revocation_address,
        peer_rpc_addresses: peer_addresses,
        ..SimulationConfig::default()
    };
    let (shutdown, shutdown_rx) = watch::channel(false);

    let mut servers = Vec::new();
    {
        let config = config.clone();
        let shutdown = shutdown_rx.clone();
        servers.push(tokio::spawn(async move {
            serve_root(&config, root_listener, shutdown).await
        }));
    }
    {
        let config = config.clone();
        let shutdown = shutdown_rx.clone();
        servers.push(tokio::spawn(async move {
            serve_org(&config, 0, org_listener, shutdown).await
        }));
    }
    {
        let config = config.clone();
        let shutdown = shutdown_rx.clone();
        servers.push(tokio::spawn(async move {
            serve_revocation(&config, revocation_listener, shutdown).await
        }));
    }
    let shared = Arc::new(config.clone());
    for (id, listener) in peer_listeners.into_iter().enumerate() {
        servers.push(tokio::spawn(serve_peer(
            shared.clone(),
            id as u64,
            listener,
            shutdown_rx.clone(),
        )));
    }

    let report = run_user(config.clone(), 0).await.unwrap();
    assert_eq!(report.transactions, 2);

    let authors = run_auditor(&config).await.unwrap();
    assert_eq!(authors.len(), 1);
    assert!(authors.contains_key(&0));

    shutdown.send(true).unwrap();
    for server in servers {
        server.await.unwrap().unwrap();
    }
}
