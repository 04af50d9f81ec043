//! # Outbound Ports (Driven Ports / SPI)

use shared_types::Transaction;

/// Append-only sink for committed transactions.
pub trait CommitLedger: Send + Sync {
    /// Record `transaction` after every peer committed it.
    fn record(&self, transaction: Transaction);
}
