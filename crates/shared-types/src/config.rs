//! # Simulation Configuration
//!
//! One value per run, built before any actor starts and shared behind an
//! `Arc`. There is no global configuration state.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::ConfigError;

/// 1 MiB/s, the default per-endpoint bandwidth.
pub const MIB: u64 = 1024 * 1024;

/// Parameters of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of organizations.
    pub orgs: usize,
    /// Users per organization.
    pub users: usize,
    /// Number of peers.
    pub peers: usize,
    /// Endorsements a transaction needs.
    pub endorsements: usize,
    /// Epoch length in seconds.
    pub epoch_secs: u64,
    /// Transactions each user submits.
    pub transactions: usize,
    /// Mean seconds between a user's transactions (0 = back to back).
    pub frequency: u64,
    /// Endorsements a peer runs at once.
    pub concurrent_endorsements: usize,
    /// Validations a peer runs at once.
    pub concurrent_validations: usize,
    /// Grants the revocation authority runs at once.
    pub concurrent_revocations: usize,
    /// Shared bandwidth in bytes per second.
    pub bandwidth_global: u64,
    /// Per-endpoint bandwidth in bytes per second.
    pub bandwidth_local: u64,
    /// Require non-revocation proofs.
    pub revoke: bool,
    /// Attach auditable encryptions.
    pub audit: bool,
    /// Simulated chaincode execution time in milliseconds.
    pub chaincode_delay_ms: u64,
    /// Where to append the JSON network-event log.
    pub network_log: Option<PathBuf>,
    /// Seed for key material and identity generation.
    pub seed: u64,
    /// Port the RPC server of this process listens on.
    pub rpc_port: u16,
    /// Root authority RPC address.
    pub root_rpc_address: String,
    /// Organization RPC address.
    pub org_rpc_address: String,
    /// Revocation authority RPC address.
    pub revocation_rpc_address: String,
    /// Peer RPC addresses, indexed by peer ID.
    pub peer_rpc_addresses: Vec<String>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            orgs: 10,
            users: 10,
            peers: 5,
            endorsements: 2,
            epoch_secs: 60,
            transactions: 5,
            frequency: 0,
            concurrent_endorsements: 10,
            concurrent_validations: 10,
            concurrent_revocations: 10,
            bandwidth_global: 10 * MIB,
            bandwidth_local: MIB,
            revoke: true,
            audit: true,
            chaincode_delay_ms: 50,
            network_log: None,
            seed: 1305,
            rpc_port: 8765,
            root_rpc_address: "127.0.0.1:8765".to_string(),
            org_rpc_address: "127.0.0.1:8766".to_string(),
            revocation_rpc_address: "127.0.0.1:8767".to_string(),
            peer_rpc_addresses: Vec::new(),
        }
    }
}

impl SimulationConfig {
    /// Reject configurations the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.peers == 0 {
            return Err(ConfigError::Zero("peers"));
        }
        if self.orgs == 0 {
            return Err(ConfigError::Zero("orgs"));
        }
        if self.epoch_secs == 0 {
            return Err(ConfigError::Zero("epoch"));
        }
        for (field, value) in [
            ("concurrent-endorsements", self.concurrent_endorsements),
            ("concurrent-validations", self.concurrent_validations),
            ("concurrent-revocations", self.concurrent_revocations),
        ] {
            if value == 0 {
                return Err(ConfigError::Zero(field));
            }
        }
        if self.bandwidth_global == 0 {
            return Err(ConfigError::Zero("bandwidth-global"));
        }
        if self.bandwidth_local == 0 {
            return Err(ConfigError::Zero("bandwidth-local"));
        }
        Ok(())
    }

    /// Total number of users.
    pub fn total_users(&self) -> usize {
        self.orgs * self.users
    }

    /// Total number of transactions the run will commit.
    pub fn total_transactions(&self) -> usize {
        self.total_users() * self.transactions
    }

    /// Epoch length.
    pub fn epoch(&self) -> Duration {
        Duration::from_secs(self.epoch_secs)
    }

    /// Simulated chaincode execution time.
    pub fn chaincode_delay(&self) -> Duration {
        Duration::from_millis(self.chaincode_delay_ms)
    }
}
