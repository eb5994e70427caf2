//! # Balance Reconciliation
//!
//! Compares the locally held balance against the server-authoritative
//! value once the caller has fetched it. The network round trip lives
//! outside this subsystem; only the comparison and its audit trail live
//! here.
//!
//! A divergence is reported, never repaired - overriding local state
//! with the remote value (or vice versa) is the caller's policy.

use std::sync::Arc;

use serde_json::json;

use tyche_shared::constants::BALANCE_EPSILON;
use tyche_shared::events::{EventSink, SecurityEventKind};

/// Result of one local-vs-remote comparison.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ReconcileOutcome {
    /// The balances agree within rounding noise.
    InSync,
    /// The balances diverge; a mismatch event was emitted.
    Divergent {
        /// `remote - local`, positive when the server holds more.
        delta: f64,
    },
}

/// Comparator for local and server-authoritative balances.
pub struct BalanceReconciler {
    epsilon: f64,
    sink: Arc<dyn EventSink>,
}

impl BalanceReconciler {
    /// Creates a reconciler with the shipped rounding tolerance.
    #[must_use]
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            epsilon: BALANCE_EPSILON,
            sink,
        }
    }

    /// Compares `local` against the authoritative `remote` value.
    ///
    /// Emits one [`SecurityEventKind::BalanceMismatch`] carrying both
    /// values when they differ by more than the tolerance.
    pub fn check(&self, local: f64, remote: f64) -> ReconcileOutcome {
        let delta = remote - local;
        if delta.abs() <= self.epsilon {
            return ReconcileOutcome::InSync;
        }
        self.sink.record(
            SecurityEventKind::BalanceMismatch,
            json!({
                "localBalance": local,
                "remoteBalance": remote,
                "delta": delta,
            }),
        );
        ReconcileOutcome::Divergent { delta }
    }
}
