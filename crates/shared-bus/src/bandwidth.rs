//! # Bandwidth-Aware Transport Simulator
//!
//! Every transfer holds three locks at once: the sender's link, the
//! receiver's link (each for `size / local bandwidth`) and the shared global
//! link (for `size / global bandwidth`). Two transfers touching the same
//! endpoint never overlap, and all transfers share the global budget.
//!
//! ```text
//!   from ──[local]──┐
//!                   ├──[global]── completes when all three holds end
//!   to   ──[local]──┘
//! ```

use chrono::Utc;
use parking_lot::Mutex as SyncMutex;
use shared_types::Transferable;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::network_log::{timestamp, NetworkEvent, NetworkEventLog};

/// Time to push `size` bytes through a link of `bandwidth` bytes per second,
/// truncated to whole milliseconds.
pub fn transfer_delay(size: usize, bandwidth: u64) -> Duration {
    if bandwidth == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis((1000.0 * size as f64 / bandwidth as f64) as u64)
}

async fn hold(lock: Arc<Mutex<()>>, delay: Duration) {
    let _guard = lock.lock().await;
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Serializes transfers per endpoint and globally, and logs each one.
pub struct BandwidthSimulator {
    local: u64,
    global: u64,
    delays: bool,
    endpoints: SyncMutex<HashMap<String, Arc<Mutex<()>>>>,
    global_link: Arc<Mutex<()>>,
    log: Arc<NetworkEventLog>,
}

impl BandwidthSimulator {
    /// Simulator with the given bandwidths in bytes per second.
    pub fn new(local: u64, global: u64, log: Arc<NetworkEventLog>) -> Self {
        Self {
            local,
            global,
            delays: true,
            endpoints: SyncMutex::new(HashMap::new()),
            global_link: Arc::new(Mutex::new(())),
            log,
        }
    }

    /// Logs transfers without delaying them. Used when a real network
    /// carries the bytes.
    pub fn passthrough(log: Arc<NetworkEventLog>) -> Self {
        Self {
            delays: false,
            ..Self::new(0, 0, log)
        }
    }

    fn endpoint(&self, name: &str) -> Arc<Mutex<()>> {
        let mut endpoints = self.endpoints.lock();
        endpoints
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Simulate sending `object` from `from` to `to`.
    ///
    /// Returns once the transfer has completed and been logged.
    pub async fn record_transfer(
        &self,
        from: &str,
        to: &str,
        object: &dyn Transferable,
    ) -> NetworkEvent {
        let size = object.size();
        let start = Utc::now();

        if self.delays {
            let local = transfer_delay(size, self.local);
            let global = transfer_delay(size, self.global);
            tokio::join!(
                hold(self.endpoint(from), local),
                hold(self.endpoint(to), local),
                hold(self.global_link.clone(), global),
            );
        }

        let end = Utc::now();
        debug!("{} sent {} bytes of {} to {}", from, size, object.name(), to);

        self.log.append(NetworkEvent {
            from: from.to_string(),
            to: to.to_string(),
            object: object.name().to_string(),
            size,
            start: timestamp(start),
            end: timestamp(end),
            global_bandwidth: self.global,
            local_bandwidth: self.local,
            id: 0,
            run_id: Uuid::nil(),
        })
    }

    /// The event log.
    pub fn log(&self) -> &Arc<NetworkEventLog> {
        &self.log
    }
}
