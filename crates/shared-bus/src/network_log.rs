//! # Network Event Log
//!
//! Append-only record of every simulated transfer, one JSON object per line.
//! Guarded by its own lock, independent of the bandwidth locks.

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, LineWriter, Write};
use std::path::Path;
use tracing::warn;
use uuid::Uuid;

/// One simulated transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkEvent {
    /// Sending endpoint.
    pub from: String,
    /// Receiving endpoint.
    pub to: String,
    /// Object label.
    pub object: String,
    /// Simulated size in bytes.
    pub size: usize,
    /// Transfer start, RFC 3339 with nanoseconds.
    pub start: String,
    /// Transfer end, RFC 3339 with nanoseconds.
    pub end: String,
    /// Shared bandwidth in bytes per second.
    pub global_bandwidth: u64,
    /// Per-endpoint bandwidth in bytes per second.
    pub local_bandwidth: u64,
    /// Monotonic event ID, starting at 1.
    #[serde(rename = "ID")]
    pub id: u64,
    /// Run the event belongs to.
    pub run_id: Uuid,
}

/// Format a timestamp the way the log stores it.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

enum Sink {
    Discard,
    File(LineWriter<File>),
    Memory(Vec<String>),
}

struct LogState {
    next_id: u64,
    sink: Sink,
}

/// Append-only log of [`NetworkEvent`]s.
pub struct NetworkEventLog {
    run_id: Uuid,
    state: Mutex<LogState>,
}

impl NetworkEventLog {
    fn with_sink(sink: Sink) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            state: Mutex::new(LogState { next_id: 1, sink }),
        }
    }

    /// Assign IDs but keep nothing.
    #[must_use]
    pub fn discard() -> Self {
        Self::with_sink(Sink::Discard)
    }

    /// Keep serialized events in memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_sink(Sink::Memory(Vec::new()))
    }

    /// Append events to `path`, creating it if needed.
    pub fn to_file(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::with_sink(Sink::File(LineWriter::new(file))))
    }

    /// ID of this run.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Stamp `event` with the next ID and run ID and append it.
    pub fn append(&self, mut event: NetworkEvent) -> NetworkEvent {
        let mut state = self.state.lock();
        event.id = state.next_id;
        event.run_id = self.run_id;
        state.next_id += 1;

        match &mut state.sink {
            Sink::Discard => {}
            Sink::Memory(lines) => match serde_json::to_string(&event) {
                Ok(line) => lines.push(line),
                Err(e) => warn!(error = %e, "failed to encode network event"),
            },
            Sink::File(writer) => {
                let written = serde_json::to_string(&event)
                    .map_err(io::Error::from)
                    .and_then(|line| writeln!(writer, "{line}"));
                if let Err(e) = written {
                    warn!(error = %e, id = event.id, "failed to append network event");
                }
            }
        }
        event
    }

    /// Number of events appended so far.
    pub fn len(&self) -> u64 {
        self.state.lock().next_id - 1
    }

    /// Whether nothing has been appended.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serialized events, when kept in memory.
    pub fn lines(&self) -> Vec<String> {
        match &self.state.lock().sink {
            Sink::Memory(lines) => lines.clone(),
            _ => Vec::new(),
        }
    }
}
