//! # Committed-Transaction Ledger
//!
//! Append-only, behind one lock. Every append logs run progress.

use dl_04_user::CommitLedger;
use parking_lot::Mutex;
use shared_types::Transaction;
use tracing::info;

/// Transactions every peer committed, in commit order.
pub struct Ledger {
    transactions: Mutex<Vec<Transaction>>,
    expected: usize,
}

impl Ledger {
    /// Ledger for a run that will commit `expected` transactions.
    pub fn new(expected: usize) -> Self {
        Self {
            transactions: Mutex::new(Vec::with_capacity(expected)),
            expected,
        }
    }

    pub fn len(&self) -> usize {
        self.transactions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.lock().is_empty()
    }

    /// Copy of the committed transactions.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.transactions.lock().clone()
    }
}

impl CommitLedger for Ledger {
    fn record(&self, transaction: Transaction) {
        let current = {
            let mut transactions = self.transactions.lock();
            transactions.push(transaction);
            transactions.len()
        };
        let percent = 100.0 * current as f64 / self.expected.max(1) as f64;
        info!(
            "[runtime] {:4.1}% - transaction {} / {}",
            percent, current, self.expected
        );
    }
}
