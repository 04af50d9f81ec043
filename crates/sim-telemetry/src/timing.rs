//! Per-transaction latency samples.

use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Phase boundaries of one committed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionTiming {
    pub start: Instant,
    pub end: Instant,
    pub endorsements_start: Instant,
    pub endorsements_end: Instant,
    pub validation_start: Instant,
    pub validation_end: Instant,
}

impl TransactionTiming {
    /// All boundaries set to `now`; callers overwrite them as phases pass.
    pub fn started_at(now: Instant) -> Self {
        Self {
            start: now,
            end: now,
            endorsements_start: now,
            endorsements_end: now,
            validation_start: now,
            validation_end: now,
        }
    }

    pub fn total(&self) -> Duration {
        self.end.saturating_duration_since(self.start)
    }

    pub fn endorsements(&self) -> Duration {
        self.endorsements_end
            .saturating_duration_since(self.endorsements_start)
    }

    pub fn validation(&self) -> Duration {
        self.validation_end
            .saturating_duration_since(self.validation_start)
    }
}

/// min / max / mean / median of a set of durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingSummary {
    pub count: usize,
    pub min: Duration,
    pub max: Duration,
    pub avg: Duration,
    /// Upper median (`sorted[n / 2]`).
    pub median: Duration,
}

impl TimingSummary {
    /// Summarize `samples`; `None` when empty.
    pub fn from_samples(mut samples: Vec<Duration>) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        samples.sort();
        let total: Duration = samples.iter().sum();
        Some(Self {
            count: samples.len(),
            min: samples[0],
            max: samples[samples.len() - 1],
            avg: total / samples.len() as u32,
            median: samples[samples.len() / 2],
        })
    }
}

/// Timing samples of a run.
#[derive(Default)]
pub struct TimingRecorder {
    samples: Mutex<Vec<TransactionTiming>>,
}

impl TimingRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, timing: TransactionTiming) {
        self.samples.lock().push(timing);
    }

    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn summarize(&self, phase: impl Fn(&TransactionTiming) -> Duration) -> Option<TimingSummary> {
        let durations = self.samples.lock().iter().map(phase).collect();
        TimingSummary::from_samples(durations)
    }

    /// Start-to-commit latency.
    pub fn total(&self) -> Option<TimingSummary> {
        self.summarize(TransactionTiming::total)
    }

    /// Endorsement phase latency.
    pub fn endorsements(&self) -> Option<TimingSummary> {
        self.summarize(TransactionTiming::endorsements)
    }

    /// Ordering-and-validation phase latency.
    pub fn validation(&self) -> Option<TimingSummary> {
        self.summarize(TransactionTiming::validation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_statistics() {
        let samples = [40, 10, 30, 20].map(Duration::from_millis).to_vec();
        let summary = TimingSummary::from_samples(samples).unwrap();

        assert_eq!(summary.count, 4);
        assert_eq!(summary.min, Duration::from_millis(10));
        assert_eq!(summary.max, Duration::from_millis(40));
        assert_eq!(summary.avg, Duration::from_millis(25));
        assert_eq!(summary.median, Duration::from_millis(30));
    }

    #[test]
    fn test_empty_summary() {
        assert!(TimingSummary::from_samples(Vec::new()).is_none());
        assert!(TimingRecorder::new().total().is_none());
    }

    #[test]
    fn test_recorder_phases() {
        let recorder = TimingRecorder::new();
        let now = Instant::now();
        let mut timing = TransactionTiming::started_at(now);
        timing.endorsements_start = now + Duration::from_millis(5);
        timing.endorsements_end = now + Duration::from_millis(105);
        timing.validation_start = now + Duration::from_millis(110);
        timing.validation_end = now + Duration::from_millis(310);
        timing.end = now + Duration::from_millis(310);
        recorder.record(timing);

        assert_eq!(recorder.len(), 1);
        assert_eq!(recorder.total().unwrap().max, Duration::from_millis(310));
        assert_eq!(recorder.endorsements().unwrap().min, Duration::from_millis(100));
        assert_eq!(recorder.validation().unwrap().median, Duration::from_millis(200));
    }
}
