//! # Audit Log
//!
//! Bounded, append-only, persisted ring buffer of security events.
//!
//! ## Lifecycle
//!
//! One instance is created by the composition root at startup, restored
//! from the persisted window, and lives for the whole process. Every
//! detector in the subsystem emits through it via [`EventSink`], which
//! stamps the timestamp and session identity centrally.
//!
//! The entire visible window (at most 100 events) is rewritten to the
//! backing store on every append. Event volume is low; simplicity wins
//! over write efficiency.
//!
//! `clear` is irreversible. This crate exposes the mechanism only -
//! gating it behind an admin surface is the caller's authorization
//! problem.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use tyche_shared::constants::{AUDIT_LOG_CAPACITY, AUDIT_LOG_KEY};
use tyche_shared::events::{EventSink, SecurityEvent, SecurityEventKind};
use tyche_shared::session::SessionContext;
use tyche_vault::storage::StorageBackend;

/// The persisted security-event trail.
pub struct AuditLog<B> {
    backend: Arc<B>,
    session: SessionContext,
    entries: Mutex<VecDeque<SecurityEvent>>,
    capacity: usize,
}

impl<B: StorageBackend> AuditLog<B> {
    /// Opens the log, restoring any persisted window from `backend`.
    ///
    /// A missing record starts an empty log. A corrupt record is
    /// reported and discarded - losing the trail beats refusing to
    /// start, and the next append rewrites a clean window.
    #[must_use]
    pub fn open(backend: Arc<B>, session: SessionContext) -> Self {
        let mut entries: VecDeque<SecurityEvent> = match backend.get(AUDIT_LOG_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<SecurityEvent>>(&raw) {
                Ok(events) => events.into(),
                Err(e) => {
                    tracing::warn!(error = %e, "persisted audit log is corrupt, starting fresh");
                    VecDeque::new()
                }
            },
            Ok(None) => VecDeque::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read persisted audit log");
                VecDeque::new()
            }
        };
        while entries.len() > AUDIT_LOG_CAPACITY {
            entries.pop_front();
        }
        Self {
            backend,
            session,
            entries: Mutex::new(entries),
            capacity: AUDIT_LOG_CAPACITY,
        }
    }

    /// Appends one event, evicting the oldest entry once the log is
    /// over capacity, then persists the whole visible window.
    pub fn append(&self, event: SecurityEvent) {
        let mut entries = self.entries.lock();
        entries.push_back(event);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
        self.persist(&entries);
    }

    /// Events in chronological order (oldest first), optionally
    /// filtered by exact kind. No filter returns everything.
    #[must_use]
    pub fn query(&self, filter: Option<&SecurityEventKind>) -> Vec<SecurityEvent> {
        let entries = self.entries.lock();
        match filter {
            None => entries.iter().cloned().collect(),
            Some(kind) => entries
                .iter()
                .filter(|e| e.event_type == *kind)
                .cloned()
                .collect(),
        }
    }

    /// Number of retained events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True when no events are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Irreversibly wipes the log, in memory and in storage.
    ///
    /// Authorization is the caller's responsibility; this subsystem
    /// trusts its caller completely.
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        entries.clear();
        if let Err(e) = self.backend.remove(AUDIT_LOG_KEY) {
            tracing::warn!(error = %e, "failed to erase persisted audit log");
        }
    }

    /// Rewrites the persisted window. Failures keep the in-memory
    /// entries and are reported through tracing only - recursing into
    /// the sink on a persist failure would loop.
    fn persist(&self, entries: &VecDeque<SecurityEvent>) {
        let window: Vec<&SecurityEvent> = entries.iter().collect();
        match serde_json::to_string(&window) {
            Ok(raw) => {
                if let Err(e) = self.backend.set(AUDIT_LOG_KEY, &raw) {
                    tracing::warn!(error = %e, "failed to persist audit log");
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to serialize audit log"),
        }
    }
}

impl<B: StorageBackend> EventSink for AuditLog<B> {
    fn record(&self, kind: SecurityEventKind, payload: Value) {
        self.append(SecurityEvent::new(kind, payload, &self.session));
    }
}
