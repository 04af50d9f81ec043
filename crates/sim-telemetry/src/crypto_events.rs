//! Counters of cryptographic operations.
//!
//! One `IntCounterVec` labelled by event kind, registered on a private
//! registry so that concurrent runs (and tests) never share counts.

use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use std::fmt;

use crate::TelemetryError;

/// A cryptographic operation worth counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CryptoEvent {
    CredDelegate,
    CredProve,
    CredVerify,
    NonRevokeGrant,
    NonRevokeProve,
    NonRevokeVerify,
    AuditEncrypt,
    AuditDecrypt,
    AuditProve,
    AuditVerify,
    Hash,
    SignNym,
    VerifyNym,
    SignSchnorr,
    VerifySchnorr,
}

impl CryptoEvent {
    /// Every event kind, in report order.
    pub const ALL: [CryptoEvent; 15] = [
        CryptoEvent::CredDelegate,
        CryptoEvent::CredProve,
        CryptoEvent::CredVerify,
        CryptoEvent::NonRevokeGrant,
        CryptoEvent::NonRevokeProve,
        CryptoEvent::NonRevokeVerify,
        CryptoEvent::AuditEncrypt,
        CryptoEvent::AuditDecrypt,
        CryptoEvent::AuditProve,
        CryptoEvent::AuditVerify,
        CryptoEvent::Hash,
        CryptoEvent::SignNym,
        CryptoEvent::VerifyNym,
        CryptoEvent::SignSchnorr,
        CryptoEvent::VerifySchnorr,
    ];

    /// Label value.
    pub fn as_str(self) -> &'static str {
        match self {
            CryptoEvent::CredDelegate => "cred-delegate",
            CryptoEvent::CredProve => "cred-prove",
            CryptoEvent::CredVerify => "cred-verify",
            CryptoEvent::NonRevokeGrant => "non-revoke-grant",
            CryptoEvent::NonRevokeProve => "non-revoke-prove",
            CryptoEvent::NonRevokeVerify => "non-revoke-verify",
            CryptoEvent::AuditEncrypt => "audit-enc",
            CryptoEvent::AuditDecrypt => "audit-dec",
            CryptoEvent::AuditProve => "audit-prove",
            CryptoEvent::AuditVerify => "audit-verify",
            CryptoEvent::Hash => "hash",
            CryptoEvent::SignNym => "sign-nym",
            CryptoEvent::VerifyNym => "verify-nym",
            CryptoEvent::SignSchnorr => "sign-schnorr",
            CryptoEvent::VerifySchnorr => "verify-schnorr",
        }
    }
}

impl fmt::Display for CryptoEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-run counts of [`CryptoEvent`]s.
pub struct CryptoEventRecorder {
    registry: Registry,
    events: IntCounterVec,
}

impl CryptoEventRecorder {
    /// Fresh recorder with all counters at zero.
    pub fn new() -> Result<Self, TelemetryError> {
        let registry = Registry::new();
        let events = IntCounterVec::new(
            Opts::new("dl_crypto_events_total", "Cryptographic operations performed"),
            &["event"],
        )
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
        registry
            .register(Box::new(events.clone()))
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

        Ok(Self { registry, events })
    }

    /// Count one occurrence of `event`.
    pub fn record(&self, event: CryptoEvent) {
        self.events.with_label_values(&[event.as_str()]).inc();
    }

    /// Occurrences of `event` so far.
    pub fn count(&self, event: CryptoEvent) -> u64 {
        self.events.with_label_values(&[event.as_str()]).get()
    }

    /// Non-zero counts, in report order.
    pub fn snapshot(&self) -> Vec<(CryptoEvent, u64)> {
        CryptoEvent::ALL
            .iter()
            .map(|event| (*event, self.count(*event)))
            .filter(|(_, count)| *count > 0)
            .collect()
    }

    /// Prometheus text exposition of the counters.
    pub fn encode(&self) -> Result<String, TelemetryError> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
    }
}
