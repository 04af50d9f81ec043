//! End-of-run statistics.

use std::fmt;
use std::time::Duration;

use crate::crypto_events::{CryptoEvent, CryptoEventRecorder};
use crate::timing::{TimingRecorder, TimingSummary};

/// Counters and latency summaries of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    pub transactions: usize,
    pub elapsed: Duration,
    pub crypto_events: Vec<(CryptoEvent, u64)>,
    pub total: Option<TimingSummary>,
    pub endorsements: Option<TimingSummary>,
    pub validation: Option<TimingSummary>,
}

impl SimulationReport {
    /// Collect the report from the run's recorders.
    pub fn collect(
        transactions: usize,
        elapsed: Duration,
        crypto: &CryptoEventRecorder,
        timings: &TimingRecorder,
    ) -> Self {
        Self {
            transactions,
            elapsed,
            crypto_events: crypto.snapshot(),
            total: timings.total(),
            endorsements: timings.endorsements(),
            validation: timings.validation(),
        }
    }
}

fn write_summary(f: &mut fmt::Formatter<'_>, label: &str, summary: &Option<TimingSummary>) -> fmt::Result {
    match summary {
        Some(s) => writeln!(
            f,
            "{:>15} : min {:4} ms, max {:4} ms, avg {:4} ms, median: {} ms",
            label,
            s.min.as_millis(),
            s.max.as_millis(),
            s.avg.as_millis(),
            s.median.as_millis()
        ),
        None => writeln!(f, "{label:>15} : no samples"),
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simulation completed in {} seconds", self.elapsed.as_secs_f64().round())?;
        writeln!(f, "Crypto events:")?;
        let per_tx = self.transactions.max(1) as f64;
        for (event, count) in &self.crypto_events {
            writeln!(
                f,
                "\t{:<20} : {:3} : ({:4.1} per transaction)",
                event.as_str(),
                count,
                *count as f64 / per_tx
            )?;
        }
        writeln!(f, "For {} transactions", self.transactions)?;
        write_summary(f, "Total", &self.total)?;
        write_summary(f, "Endorsements", &self.endorsements)?;
        write_summary(f, "Validation", &self.validation)
    }
}
