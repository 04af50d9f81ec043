//! # DAC Ledger Simulator
//!
//! Entry point. `simulate` runs the whole network in this process; every
//! other subcommand runs one role of a distributed deployment.
//!
//! ## Startup Sequence
//!
//! 1. Parse flags into a `SimulationConfig`
//! 2. Initialize logging for the role
//! 3. Validate the configuration
//! 4. Run the role

use anyhow::{Context, Result};
use clap::Parser;
use node_runtime::distributed::{
    bind_role, run_auditor, run_user, serve_org, serve_peer, serve_revocation, serve_root,
};
use node_runtime::{simulate, Cli, Role};
use sim_telemetry::{init_logging, TelemetryConfig};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&TelemetryConfig::for_role(cli.command.label()).verbose(cli.verbose))?;

    let config = cli.params.into_config();
    config.validate().context("invalid configuration")?;
    info!("[runtime] starting {} (seed {})", cli.command.label(), config.seed);

    match cli.command {
        Role::Simulate => {
            let report = simulate(config).await?;
            println!("{report}");
        }
        Role::Root => {
            let (listener, shutdown) = bind_role(&config).await?;
            serve_root(&config, listener, shutdown).await?;
        }
        Role::Org { id } => {
            let (listener, shutdown) = bind_role(&config).await?;
            serve_org(&config, id, listener, shutdown).await?;
        }
        Role::Revocation => {
            let (listener, shutdown) = bind_role(&config).await?;
            serve_revocation(&config, listener, shutdown).await?;
        }
        Role::Peer { id } => {
            let (listener, shutdown) = bind_role(&config).await?;
            serve_peer(Arc::new(config), id, listener, shutdown).await?;
        }
        Role::User { id } => {
            let report = run_user(config, id).await?;
            println!("{report}");
        }
        Role::Auditor => {
            let authors = run_auditor(&config).await?;
            println!("Audited transactions of {} users", authors.len());
        }
    }
    Ok(())
}
