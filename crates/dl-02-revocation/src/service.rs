//! # Revocation Service
//!
//! Grants handles under the configured concurrency cap. Shared by the
//! in-process actor and the RPC server.

use rand::rngs::OsRng;
use shared_bus::BandwidthSimulator;
use shared_crypto::PublicKey;
use shared_types::{user_name, NonRevocationHandle, NonRevocationRequest, REVOCATION_AUTHORITY};
use sim_telemetry::{CryptoEvent, SimulationRecorder};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::domain::authority::RevocationAuthority;
use crate::domain::epoch::EpochCounter;

pub struct RevocationService {
    authority: RevocationAuthority,
    epoch: EpochCounter,
    limiter: Arc<Semaphore>,
    bandwidth: Arc<BandwidthSimulator>,
    recorder: SimulationRecorder,
}

impl RevocationService {
    pub fn new(
        authority: RevocationAuthority,
        epoch: EpochCounter,
        concurrency: usize,
        bandwidth: Arc<BandwidthSimulator>,
        recorder: SimulationRecorder,
    ) -> Self {
        Self {
            authority,
            epoch,
            limiter: Arc::new(Semaphore::new(concurrency)),
            bandwidth,
            recorder,
        }
    }

    pub fn public_key(&self) -> PublicKey {
        self.authority.public_key()
    }

    pub fn epoch(&self) -> &EpochCounter {
        &self.epoch
    }

    /// Receive `request`, sign it for the current epoch and send the handle
    /// back. Waits for a free permit first.
    pub async fn grant(&self, request: NonRevocationRequest) -> NonRevocationHandle {
        let user = user_name(request.user_id);
        self.bandwidth
            .record_transfer(&user, REVOCATION_AUTHORITY, &request)
            .await;

        let handle = {
            // The limiter is never closed.
            let _permit = self.limiter.acquire().await.ok();
            let epoch = self.epoch.current();
            let handle = self.authority.grant(&mut OsRng, &request, epoch);
            self.recorder.record(CryptoEvent::NonRevokeGrant);
            handle
        };
        debug!("[dl-02] granted {} a handle for epoch {}", user, handle.epoch);

        self.bandwidth
            .record_transfer(REVOCATION_AUTHORITY, &user, &handle)
            .await;
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::authority::verify_handle;
    use shared_bus::NetworkEventLog;
    use shared_crypto::generate_keys;

    fn service(log: Arc<NetworkEventLog>) -> RevocationService {
        RevocationService::new(
            RevocationAuthority::from_seed(2),
            EpochCounter::new(),
            2,
            Arc::new(BandwidthSimulator::passthrough(log)),
            SimulationRecorder::new().unwrap(),
        )
    }

    #[tokio::test]
    async fn test_grant_uses_current_epoch() {
        let log = Arc::new(NetworkEventLog::in_memory());
        let service = service(log.clone());
        service.epoch().advance();
        let user = generate_keys(&mut OsRng, 2);

        let handle = service
            .grant(NonRevocationRequest {
                user_id: 6,
                user_pk: user.pk,
            })
            .await;

        assert_eq!(handle.epoch, 2);
        assert!(verify_handle(&handle, &service.public_key(), &user.pk).is_ok());
        assert_eq!(service.recorder.crypto.count(CryptoEvent::NonRevokeGrant), 1);

        let lines = log.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"Object\":\"non-revocation-request\""));
        assert!(lines[1].contains("\"To\":\"user-6\""));
    }
}
