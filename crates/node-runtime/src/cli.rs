//! # Command Line
//!
//! Every simulation parameter is a global flag, so it can follow any
//! subcommand. Flags map 1:1 onto [`SimulationConfig`].

use clap::{Args, Parser, Subcommand};
use shared_types::{SimulationConfig, MIB};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dac-ledger")]
#[command(about = "Simulates a permissioned ledger whose users prove identity with delegatable anonymous credentials")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Role,

    #[command(flatten)]
    pub params: SimulationArgs,

    /// Debug-level logs
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// What this process runs.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Whole network in this process
    Simulate,
    /// Root authority server
    Root,
    /// Organization server
    Org {
        #[arg(long, default_value_t = 0)]
        id: u64,
    },
    /// Peer server
    Peer {
        #[arg(long, default_value_t = 0)]
        id: u64,
    },
    /// Revocation authority server
    Revocation,
    /// User client
    User {
        #[arg(long, default_value_t = 0)]
        id: u64,
    },
    /// Auditor client
    Auditor,
}

impl Role {
    /// Label used for the logging service name.
    pub fn label(self) -> &'static str {
        match self {
            Role::Simulate => "simulator",
            Role::Root => "root",
            Role::Org { .. } => "org",
            Role::Peer { .. } => "peer",
            Role::Revocation => "revocation",
            Role::User { .. } => "user",
            Role::Auditor => "auditor",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct SimulationArgs {
    /// Number of organizations
    #[arg(long, global = true, default_value_t = 10)]
    pub orgs: usize,

    /// Users per organization
    #[arg(long, global = true, default_value_t = 10)]
    pub users: usize,

    /// Number of peers
    #[arg(long, global = true, default_value_t = 5)]
    pub peers: usize,

    /// Endorsements a transaction needs
    #[arg(long, global = true, default_value_t = 2)]
    pub endorsements: usize,

    /// Epoch length in seconds
    #[arg(long, global = true, default_value_t = 60)]
    pub epoch: u64,

    /// Transactions per user
    #[arg(long, global = true, default_value_t = 5)]
    pub transactions: usize,

    /// Mean seconds between a user's transactions (0 = back to back)
    #[arg(long, global = true, default_value_t = 0)]
    pub frequency: u64,

    #[arg(long, global = true, default_value_t = 10)]
    pub concurrent_endorsements: usize,

    #[arg(long, global = true, default_value_t = 10)]
    pub concurrent_validations: usize,

    #[arg(long, global = true, default_value_t = 10)]
    pub concurrent_revocations: usize,

    /// Shared bandwidth, bytes per second
    #[arg(long, global = true, default_value_t = 10 * MIB)]
    pub bandwidth_global: u64,

    /// Per-endpoint bandwidth, bytes per second
    #[arg(long, global = true, default_value_t = MIB)]
    pub bandwidth_local: u64,

    /// Skip non-revocation proofs
    #[arg(long, global = true)]
    pub no_revoke: bool,

    /// Skip audit encryptions
    #[arg(long, global = true)]
    pub no_audit: bool,

    /// Simulated chaincode execution in milliseconds
    #[arg(long, global = true, default_value_t = 50)]
    pub chaincode_delay: u64,

    /// Append the JSON network-event log here
    #[arg(long, global = true)]
    pub network_log: Option<PathBuf>,

    /// Seed for key material and identities
    #[arg(long, global = true, default_value_t = 1305)]
    pub seed: u64,

    /// Port a server role listens on
    #[arg(long, global = true, default_value_t = 8765)]
    pub rpc_port: u16,

    #[arg(long, global = true, default_value = "127.0.0.1:8765")]
    pub root_rpc_address: String,

    #[arg(long, global = true, default_value = "127.0.0.1:8766")]
    pub org_rpc_address: String,

    #[arg(long, global = true, default_value = "127.0.0.1:8767")]
    pub revocation_rpc_address: String,

    /// Peer address, repeated once per peer in ID order
    #[arg(long = "peer-rpc-address", global = true)]
    pub peer_rpc_addresses: Vec<String>,
}

impl SimulationArgs {
    pub fn into_config(self) -> SimulationConfig {
        SimulationConfig {
            orgs: self.orgs,
            users: self.users,
            peers: self.peers,
            endorsements: self.endorsements,
            epoch_secs: self.epoch,
            transactions: self.transactions,
            frequency: self.frequency,
            concurrent_endorsements: self.concurrent_endorsements,
            concurrent_validations: self.concurrent_validations,
            concurrent_revocations: self.concurrent_revocations,
            bandwidth_global: self.bandwidth_global,
            bandwidth_local: self.bandwidth_local,
            revoke: !self.no_revoke,
            audit: !self.no_audit,
            chaincode_delay_ms: self.chaincode_delay,
            network_log: self.network_log,
            seed: self.seed,
            rpc_port: self.rpc_port,
            root_rpc_address: self.root_rpc_address,
            org_rpc_address: self.org_rpc_address,
            revocation_rpc_address: self.revocation_rpc_address,
            peer_rpc_addresses: self.peer_rpc_addresses,
        }
    }
}
