//! # Peer RPC Binding
//!
//! `Endorse`, `Order`, `Validate` and `Audit` over the shared transport.
//! The client turns each reply into the channel message an in-process peer
//! would have sent, so users cannot tell the bindings apart.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_bus::{RequestHandler, RpcClient, RpcError};
use shared_types::{
    abort, peer_name, AuditRecord, Endorsement, PeerId, ProtocolViolation, Transaction,
    TransactionProposal,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::errors::PeerError;
use crate::ports::inbound::PeerApi;
use crate::service::PeerCore;

#[derive(Debug, Serialize, Deserialize)]
pub enum PeerRequest {
    Endorse(TransactionProposal),
    Order(Transaction),
    Validate(Transaction),
    Audit,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum PeerResponse {
    Endorsement(Endorsement),
    /// IDs of every peer that validated the ordered transaction.
    Committed(Vec<PeerId>),
    Validated(PeerId),
    AuditRecords(Vec<AuditRecord>),
}

/// Server side.
pub struct PeerRpcServer {
    core: Arc<PeerCore>,
}

impl PeerRpcServer {
    pub fn new(core: Arc<PeerCore>) -> Self {
        Self { core }
    }
}

#[async_trait]
impl RequestHandler for PeerRpcServer {
    type Request = PeerRequest;
    type Response = PeerResponse;

    async fn handle(&self, request: PeerRequest) -> PeerResponse {
        let name = self.core.name();
        match request {
            PeerRequest::Endorse(proposal) => match self.core.endorse(&proposal).await {
                Ok(endorsement) => PeerResponse::Endorsement(endorsement),
                Err(violation) => abort(&name, violation),
            },
            PeerRequest::Order(transaction) => {
                let peers = self.core.directory().len();
                let (commits, mut committed) = mpsc::channel(peers.max(1));
                if let Err(violation) = self.core.order(transaction, commits).await {
                    abort(&name, violation);
                }
                let mut ids = Vec::with_capacity(peers);
                while ids.len() < peers {
                    match committed.recv().await {
                        Some(id) => ids.push(id),
                        None => break,
                    }
                }
                PeerResponse::Committed(ids)
            }
            PeerRequest::Validate(transaction) => {
                match self.core.validate(&transaction).await {
                    Ok(()) => PeerResponse::Validated(self.core.id()),
                    Err(violation) => abort(&name, violation),
                }
            }
            PeerRequest::Audit => PeerResponse::AuditRecords(self.core.audit_records()),
        }
    }
}

/// Client side of one remote peer.
#[derive(Debug, Clone)]
pub struct RpcPeerClient {
    id: PeerId,
    client: RpcClient,
}

impl RpcPeerClient {
    pub fn new(id: PeerId, address: impl Into<String>) -> Self {
        Self {
            id,
            client: RpcClient::new(address),
        }
    }

    pub fn id(&self) -> PeerId {
        self.id
    }

    async fn call(&self, request: &PeerRequest) -> Result<PeerResponse, PeerError> {
        Ok(self.client.call(request).await?)
    }

    /// Audit records the remote peer collected.
    pub async fn audit(&self) -> Result<Vec<AuditRecord>, PeerError> {
        match self.call(&PeerRequest::Audit).await? {
            PeerResponse::AuditRecords(records) => Ok(records),
            _ => Err(RpcError::UnexpectedReply("Audit").into()),
        }
    }

    /// Issue `request` on its own task and forward what `extract` pulls
    /// out of the reply to `sender`. A peer that stays unreachable ends
    /// the run.
    fn spawn_call<T, F>(&self, request: PeerRequest, method: &'static str, extract: F, sender: mpsc::Sender<T>)
    where
        T: Send + 'static,
        F: FnOnce(PeerResponse) -> Option<Vec<T>> + Send + 'static,
    {
        let client = self.clone();
        tokio::spawn(async move {
            let context = peer_name(client.id);
            let response = match client.call(&request).await {
                Ok(response) => response,
                Err(e) => abort(
                    &context,
                    ProtocolViolation::Unreachable(format!("{} ({})", client.client.address(), e)),
                ),
            };
            let Some(values) = extract(response) else {
                abort(
                    &context,
                    ProtocolViolation::Unreachable(RpcError::UnexpectedReply(method).to_string()),
                );
            };
            for value in values {
                if sender.send(value).await.is_err() {
                    debug!("[dl-03] reply from {} dropped, requester gone", context);
                    return;
                }
            }
        });
    }
}

#[async_trait]
impl PeerApi for RpcPeerClient {
    async fn submit_endorsement(
        &self,
        proposal: Arc<TransactionProposal>,
        reply: mpsc::Sender<Endorsement>,
    ) -> Result<(), PeerError> {
        let request = PeerRequest::Endorse(proposal.as_ref().clone());
        self.spawn_call(
            request,
            "Endorse",
            |response| match response {
                PeerResponse::Endorsement(endorsement) => Some(vec![endorsement]),
                _ => None,
            },
            reply,
        );
        Ok(())
    }

    async fn submit_order(
        &self,
        transaction: Transaction,
        commits: mpsc::Sender<PeerId>,
    ) -> Result<(), PeerError> {
        self.spawn_call(
            PeerRequest::Order(transaction),
            "Order",
            |response| match response {
                PeerResponse::Committed(ids) => Some(ids),
                _ => None,
            },
            commits,
        );
        Ok(())
    }

    async fn submit_validation(
        &self,
        transaction: Arc<Transaction>,
        commits: mpsc::Sender<PeerId>,
    ) -> Result<(), PeerError> {
        let request = PeerRequest::Validate(transaction.as_ref().clone());
        self.spawn_call(
            request,
            "Validate",
            |response| match response {
                PeerResponse::Validated(id) => Some(vec![id]),
                _ => None,
            },
            commits,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{peer_keys, PeerDirectory, PeerEntry};
    use crate::domain::fixtures::{Fixture, SEED};
    use shared_bus::{bind, serve, BandwidthSimulator, NetworkEventLog};
    use shared_types::SimulationConfig;
    use sim_telemetry::SimulationRecorder;
    use tokio::sync::watch;

    #[tokio::test]
    async fn test_order_and_audit_over_rpc() {
        let fixture = Fixture::new();
        let config = Arc::new(SimulationConfig {
            peers: 2,
            endorsements: 2,
            chaincode_delay_ms: 0,
            ..SimulationConfig::default()
        });

        let mut listeners = Vec::new();
        let mut clients = Vec::new();
        for id in 0..2 {
            let listener = bind("127.0.0.1:0").await.unwrap();
            clients.push(RpcPeerClient::new(id, listener.local_addr().unwrap().to_string()));
            listeners.push(listener);
        }
        let directory = Arc::new(PeerDirectory::new(
            clients
                .iter()
                .map(|client| PeerEntry {
                    id: client.id(),
                    public_key: peer_keys(SEED, client.id()).pk,
                    api: Arc::new(client.clone()) as Arc<dyn PeerApi>,
                })
                .collect(),
        ));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut servers = Vec::new();
        for (id, listener) in listeners.into_iter().enumerate() {
            let id = id as PeerId;
            let core = PeerCore::new(
                id,
                peer_keys(SEED, id),
                fixture.anchors(),
                config.clone(),
                directory.clone(),
                Arc::new(BandwidthSimulator::passthrough(Arc::new(NetworkEventLog::discard()))),
                SimulationRecorder::new().unwrap(),
            );
            servers.push(tokio::spawn(serve(
                listener,
                Arc::new(PeerRpcServer::new(Arc::new(core))),
                shutdown_rx.clone(),
            )));
        }

        let (proposal, nym) = fixture.proposal("remote");
        let (reply_tx, mut reply_rx) = mpsc::channel(2);
        let shared = Arc::new(proposal.clone());
        for client in &clients {
            client.submit_endorsement(shared.clone(), reply_tx.clone()).await.unwrap();
        }
        let endorsements = vec![reply_rx.recv().await.unwrap(), reply_rx.recv().await.unwrap()];

        let transaction = fixture.transaction(proposal, &nym, endorsements, 1);
        let (commits_tx, mut commits_rx) = mpsc::channel(2);
        clients[1].submit_order(transaction, commits_tx).await.unwrap();
        let mut committed = vec![commits_rx.recv().await.unwrap(), commits_rx.recv().await.unwrap()];
        committed.sort_unstable();
        assert_eq!(committed, vec![0, 1]);

        let records = clients[0].audit().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].author_id, 0);

        shutdown_tx.send(true).unwrap();
        for server in servers {
            server.await.unwrap();
        }
    }
}
