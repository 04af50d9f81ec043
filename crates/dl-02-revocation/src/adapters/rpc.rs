//! # Revocation RPC Binding
//!
//! `GetEpoch`, `GetPK` and `ProcessNRR`. In distributed mode the epoch
//! timer runs next to the server and advances unconditionally.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_bus::{RequestHandler, RpcClient, RpcError};
use shared_crypto::PublicKey;
use shared_types::{NonRevocationHandle, NonRevocationRequest};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant};
use tracing::info;

use crate::domain::epoch::EpochCounter;
use crate::domain::errors::RevocationError;
use crate::ports::inbound::RevocationApi;
use crate::service::RevocationService;

#[derive(Debug, Serialize, Deserialize)]
pub enum RevocationRequest {
    GetEpoch,
    GetPk,
    ProcessNrr(NonRevocationRequest),
}

#[derive(Debug, Serialize, Deserialize)]
pub enum RevocationResponse {
    Epoch(u64),
    PublicKey(PublicKey),
    Handle(NonRevocationHandle),
}

/// Server side.
pub struct RevocationRpcServer {
    service: Arc<RevocationService>,
}

impl RevocationRpcServer {
    pub fn new(service: Arc<RevocationService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl RequestHandler for RevocationRpcServer {
    type Request = RevocationRequest;
    type Response = RevocationResponse;

    async fn handle(&self, request: RevocationRequest) -> RevocationResponse {
        match request {
            RevocationRequest::GetEpoch => RevocationResponse::Epoch(self.service.epoch().current()),
            RevocationRequest::GetPk => RevocationResponse::PublicKey(self.service.public_key()),
            RevocationRequest::ProcessNrr(request) => {
                RevocationResponse::Handle(self.service.grant(request).await)
            }
        }
    }
}

/// Advance `epoch` every `period` until shutdown.
pub async fn run_epoch_timer(epoch: EpochCounter, period: Duration, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = interval_at(Instant::now() + period, period);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                info!("[dl-02] epoch advanced to {}", epoch.advance());
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
}

/// Client side.
#[derive(Debug, Clone)]
pub struct RpcRevocationClient {
    client: RpcClient,
}

impl RpcRevocationClient {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            client: RpcClient::new(address),
        }
    }
}

#[async_trait]
impl RevocationApi for RpcRevocationClient {
    async fn current_epoch(&self) -> Result<u64, RevocationError> {
        match self.client.call(&RevocationRequest::GetEpoch).await? {
            RevocationResponse::Epoch(epoch) => Ok(epoch),
            _ => Err(RpcError::UnexpectedReply("GetEpoch").into()),
        }
    }

    async fn public_key(&self) -> Result<PublicKey, RevocationError> {
        match self.client.call(&RevocationRequest::GetPk).await? {
            RevocationResponse::PublicKey(pk) => Ok(pk),
            _ => Err(RpcError::UnexpectedReply("GetPK").into()),
        }
    }

    async fn request_handle(
        &self,
        request: NonRevocationRequest,
    ) -> Result<NonRevocationHandle, RevocationError> {
        match self.client.call(&RevocationRequest::ProcessNrr(request)).await? {
            RevocationResponse::Handle(handle) => Ok(handle),
            _ => Err(RpcError::UnexpectedReply("ProcessNRR").into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::authority::{verify_handle, RevocationAuthority};
    use rand::rngs::OsRng;
    use shared_bus::{bind, serve, BandwidthSimulator, NetworkEventLog};
    use shared_crypto::generate_keys;
    use sim_telemetry::SimulationRecorder;

    #[tokio::test]
    async fn test_grant_over_rpc() {
        let service = Arc::new(RevocationService::new(
            RevocationAuthority::from_seed(12),
            EpochCounter::new(),
            4,
            Arc::new(BandwidthSimulator::passthrough(Arc::new(NetworkEventLog::discard()))),
            SimulationRecorder::new().unwrap(),
        ));
        let listener = bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let server = tokio::spawn(serve(
            listener,
            Arc::new(RevocationRpcServer::new(service)),
            shutdown_rx,
        ));

        let client = RpcRevocationClient::new(address);
        let user = generate_keys(&mut OsRng, 2);
        let epoch = client.current_epoch().await.unwrap();
        let authority_pk = client.public_key().await.unwrap();
        let handle = client
            .request_handle(NonRevocationRequest {
                user_id: 1,
                user_pk: user.pk,
            })
            .await
            .unwrap();

        assert_eq!(epoch, 1);
        assert_eq!(authority_pk, RevocationAuthority::from_seed(12).public_key());
        assert!(verify_handle(&handle, &authority_pk, &user.pk).is_ok());

        shutdown_tx.send(true).unwrap();
        server.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_epoch_timer_advances_unconditionally() {
        let epoch = EpochCounter::new();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let timer = tokio::spawn(run_epoch_timer(epoch.clone(), Duration::from_secs(5), shutdown_rx));

        tokio::time::sleep(Duration::from_secs(16)).await;
        assert_eq!(epoch.current(), 4);

        shutdown_tx.send(true).unwrap();
        timer.await.unwrap();
    }
}
