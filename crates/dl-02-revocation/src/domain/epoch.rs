//! # Epoch Counter
//!
//! Shared, monotonic epoch. Starts at 1 and only moves forward.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// First epoch of every run.
pub const INITIAL_EPOCH: u64 = 1;

/// Cloneable handle to the run's epoch.
#[derive(Debug, Clone)]
pub struct EpochCounter(Arc<AtomicU64>);

impl EpochCounter {
    pub fn new() -> Self {
        Self(Arc::new(AtomicU64::new(INITIAL_EPOCH)))
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    /// Move to the next epoch and return it.
    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl Default for EpochCounter {
    fn default() -> Self {
        Self::new()
    }
}
