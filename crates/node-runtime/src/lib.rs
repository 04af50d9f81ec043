//! # DAC Ledger Runtime
//!
//! Wires the role crates into a runnable simulation, in one process or as
//! one process per role.
//!
//! ## Modules
//!
//! - `network` - in-process network: identity hierarchy, actors, driver
//! - `distributed` - server and client roles over RPC
//! - `ledger` - committed-transaction ledger
//! - `audit` - auditor pass over committed transactions
//! - `cli` - command line, mapped onto `SimulationConfig`
//!
//! ## Simulation Flow
//!
//! ```text
//! root ──▶ orgs ──▶ users          (concurrent enrollment)
//! peers + revocation authority     (actors)
//! users ──▶ transactions ──▶ ledger
//! auditor ──▶ decrypt every transaction ──▶ stop ──▶ report
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod audit;
pub mod cli;
pub mod distributed;
pub mod ledger;
pub mod network;

pub use audit::{audit_records, audit_transactions};
pub use cli::{Cli, Role, SimulationArgs};
pub use ledger::Ledger;
pub use network::{simulate, Network};
