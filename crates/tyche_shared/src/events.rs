//! Security events and the sink they are emitted through.
//!
//! Every detector in the subsystem (store, heuristics, validators, rate
//! limiter, reconciler) reports through [`EventSink`] instead of logging
//! to the console, so tests and admin surfaces can assert on structured
//! records rather than log output.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clock;
use crate::session::SessionContext;

/// Tag identifying what kind of security event occurred.
///
/// The set is open: tags round-trip through their string form, and
/// unknown tags deserialize into [`SecurityEventKind::Other`] instead of
/// failing, so an older client can still read a log written by a newer
/// one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SecurityEventKind {
    /// A persisted record failed decode or checksum verification.
    TamperingDetected,
    /// Local balance diverged from the server-authoritative balance.
    BalanceMismatch,
    /// One or more anti-cheat heuristics fired on a snapshot.
    AntiCheatTriggered,
    /// An action exceeded its sliding-window rate limit.
    RateLimitExceeded,
    /// A dice roll reported values outside the legal faces.
    InvalidDiceValues,
    /// A loaded game state failed structural plausibility checks.
    InvalidGameState,
    /// A client-reported action time was implausibly skewed.
    SuspiciousTimestamp,
    /// A persistence attempt failed and was swallowed.
    StorageFailure,
    /// A tag this client version does not know.
    Other(String),
}

impl SecurityEventKind {
    /// The string tag this kind serializes as.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::TamperingDetected => "TamperingDetected",
            Self::BalanceMismatch => "BalanceMismatch",
            Self::AntiCheatTriggered => "AntiCheatTriggered",
            Self::RateLimitExceeded => "RateLimitExceeded",
            Self::InvalidDiceValues => "InvalidDiceValues",
            Self::InvalidGameState => "InvalidGameState",
            Self::SuspiciousTimestamp => "SuspiciousTimestamp",
            Self::StorageFailure => "StorageFailure",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for SecurityEventKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "TamperingDetected" => Self::TamperingDetected,
            "BalanceMismatch" => Self::BalanceMismatch,
            "AntiCheatTriggered" => Self::AntiCheatTriggered,
            "RateLimitExceeded" => Self::RateLimitExceeded,
            "InvalidDiceValues" => Self::InvalidDiceValues,
            "InvalidGameState" => Self::InvalidGameState,
            "SuspiciousTimestamp" => Self::SuspiciousTimestamp,
            "StorageFailure" => Self::StorageFailure,
            _ => Self::Other(tag),
        }
    }
}

impl From<SecurityEventKind> for String {
    fn from(kind: SecurityEventKind) -> Self {
        kind.as_str().to_owned()
    }
}

impl std::fmt::Display for SecurityEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit record.
///
/// Events are append-only: once constructed they are never mutated.
/// Field names mirror the persisted JSON format of the hosting client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityEvent {
    /// What happened.
    pub event_type: SecurityEventKind,
    /// When it happened, epoch milliseconds.
    pub timestamp: u64,
    /// Structured details (offending key, both balances, violations...).
    pub payload: Value,
    /// User-agent equivalent of the emitting client.
    pub client_context: String,
    /// Identity of the browser-tab session that emitted the event.
    pub session_id: String,
}

impl SecurityEvent {
    /// Builds an event stamped with the current time and session identity.
    #[must_use]
    pub fn new(kind: SecurityEventKind, payload: Value, session: &SessionContext) -> Self {
        Self {
            event_type: kind,
            timestamp: clock::now_millis(),
            payload,
            client_context: session.client_context().to_owned(),
            session_id: session.id().to_owned(),
        }
    }
}

/// Seam between event producers and the audit log.
///
/// The composition root injects one shared sink (the audit log) into
/// every detector. Producers hand over a kind and a payload; the sink
/// owns timestamping, session stamping, and retention.
pub trait EventSink: Send + Sync {
    /// Records one security event.
    fn record(&self, kind: SecurityEventKind, payload: Value);
}

/// Sink that discards everything.
///
/// For benchmarks and for components exercised without an audit trail.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&self, _kind: SecurityEventKind, _payload: Value) {}
}

/// Sink that buffers emitted events in memory.
///
/// Tests use this to assert on exactly which events a component emitted
/// without standing up the full audit log.
#[derive(Debug, Default)]
pub struct MemorySink {
    recorded: Mutex<Vec<(SecurityEventKind, Value)>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far, in emission order.
    #[must_use]
    pub fn recorded(&self) -> Vec<(SecurityEventKind, Value)> {
        self.recorded.lock().clone()
    }

    /// Number of recorded events of the given kind.
    #[must_use]
    pub fn count_of(&self, kind: &SecurityEventKind) -> usize {
        self.recorded
            .lock()
            .iter()
            .filter(|(k, _)| k == kind)
            .count()
    }
}

impl EventSink for MemorySink {
    fn record(&self, kind: SecurityEventKind, payload: Value) {
        self.recorded.lock().push((kind, payload));
    }
}
