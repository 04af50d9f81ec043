//! # Simulation Telemetry
//!
//! Logging bootstrap plus the run-scoped recorders the report is built from.
//!
//! ## Components
//!
//! - **Logging**: `tracing-subscriber` with an `EnvFilter`, plain or JSON
//! - **Crypto events**: Prometheus counters per cryptographic operation
//! - **Timings**: per-transaction phase latencies
//! - **Report**: counts and min/max/avg/median latencies at shutdown
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sim_telemetry::{init_logging, SimulationRecorder, TelemetryConfig};
//!
//! init_logging(&TelemetryConfig::from_env())?;
//! let recorder = SimulationRecorder::new()?;
//! recorder.crypto.record(CryptoEvent::Hash);
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `DL_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `DL_JSON_LOGS` | `false` | JSON log lines |
//! | `DL_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `DL_SERVICE_NAME` | `dac-ledger` | Service name in startup logs |

#![cfg_attr(test, allow(clippy::unwrap_used))]

mod config;
mod crypto_events;
mod logging;
mod report;
mod timing;

pub use config::TelemetryConfig;
pub use crypto_events::{CryptoEvent, CryptoEventRecorder};
pub use logging::init_logging;
pub use report::SimulationReport;
pub use timing::{TimingRecorder, TimingSummary, TransactionTiming};

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Recorders shared by every actor of one run.
#[derive(Clone)]
pub struct SimulationRecorder {
    pub crypto: Arc<CryptoEventRecorder>,
    pub timings: Arc<TimingRecorder>,
}

impl SimulationRecorder {
    pub fn new() -> Result<Self, TelemetryError> {
        Ok(Self {
            crypto: Arc::new(CryptoEventRecorder::new()?),
            timings: Arc::new(TimingRecorder::new()),
        })
    }

    /// Shorthand for `self.crypto.record(event)`.
    pub fn record(&self, event: CryptoEvent) {
        self.crypto.record(event);
    }

    /// Build the final report.
    pub fn report(&self, transactions: usize, elapsed: Duration) -> SimulationReport {
        SimulationReport::collect(transactions, elapsed, &self.crypto, &self.timings)
    }
}
