//! # TYCHE - Client-Side Integrity & Anti-Cheat
//!
//! The subsystem the rest of the application calls to persist progress
//! between sessions and to sanity-check every figure the client reports.
//!
//! ## What it buys
//!
//! - Casual tampering with the local save is detected, audited, and
//!   self-healed (the record resets to the caller's default)
//! - Implausible game states are flagged before they are displayed
//! - Burst actions are throttled
//! - Everything above leaves a bounded, inspectable audit trail
//!
//! ## What it does not buy
//!
//! This is NOT a cryptographic security boundary. The transform key
//! ships in the binary and the checksum is a weak rolling hash - by
//! design. True authority over balances is the remote server; this
//! layer only filters and audits between the user's device and that
//! server.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tyche::{Integrity, IntegrityConfig};
//! use tyche_vault::MemoryBackend;
//!
//! let backend = Arc::new(MemoryBackend::new());
//! let integrity = Integrity::new(backend);
//!
//! integrity.save("player:42:state", &state);
//! let restored = integrity.load("player:42:state", GameState::default());
//!
//! if integrity.evaluate(&restored.snapshot()).suspicious {
//!     // enforcement policy is yours: re-sync, clamp, or escalate
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use tyche_security::audit::AuditLog;
use tyche_security::heuristics::{HeuristicsEngine, HeuristicsReport};
use tyche_security::rate_limit::RateLimiter;
use tyche_security::reconcile::{BalanceReconciler, ReconcileOutcome};
use tyche_security::validation::{InputValidator, ValidationVerdict};
use tyche_shared::events::EventSink;
use tyche_shared::session::SessionContext;
use tyche_shared::snapshot::GameStateSnapshot;
use tyche_vault::storage::StorageBackend;
use tyche_vault::store::SecureStore;

pub use config::{ConfigError, IntegrityConfig};

/// The assembled integrity subsystem.
///
/// Owns the one [`AuditLog`] instance for the process (replacing any
/// notion of global mutable log state) and injects it into every
/// detector. Created once at startup by the application's composition
/// root and never torn down.
pub struct Integrity<B> {
    store: SecureStore<B>,
    audit: Arc<AuditLog<B>>,
    engine: HeuristicsEngine,
    validator: InputValidator,
    limiter: RateLimiter,
    reconciler: BalanceReconciler,
}

impl<B: StorageBackend + 'static> Integrity<B> {
    /// Assembles the subsystem over `backend` with shipped defaults.
    #[must_use]
    pub fn new(backend: Arc<B>) -> Self {
        Self::with_config(backend, IntegrityConfig::default())
    }

    /// Assembles the subsystem over `backend` with explicit config.
    ///
    /// Generates the session identity, restores the persisted audit
    /// window, and wires every component to the shared sink.
    #[must_use]
    pub fn with_config(backend: Arc<B>, config: IntegrityConfig) -> Self {
        let session = SessionContext::new();
        tracing::debug!(session = session.id(), "integrity subsystem starting");

        let audit = Arc::new(AuditLog::open(Arc::clone(&backend), session));
        let sink: Arc<dyn EventSink> = audit.clone();

        Self {
            store: SecureStore::new(backend, Arc::clone(&sink)),
            engine: HeuristicsEngine::new(config.heuristics, Arc::clone(&sink)),
            validator: InputValidator::new(Arc::clone(&sink)),
            limiter: RateLimiter::new(config.rate_limit, Arc::clone(&sink)),
            reconciler: BalanceReconciler::new(sink),
            audit,
        }
    }

    /// Persists `value` under `key`. Failures are audited and swallowed;
    /// do not assume persistence succeeded.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) {
        self.store.save(key, value);
    }

    /// Restores the value under `key`, or `default` when absent or
    /// tampered (tampering is audited and the record erased).
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.store.load(key, default)
    }

    /// Judges a snapshot against the anti-cheat rules.
    pub fn evaluate(&self, snapshot: &GameStateSnapshot) -> HeuristicsReport {
        self.engine.evaluate(snapshot)
    }

    /// Checks an action against the default rate-limit window.
    pub fn allow(&self, action_key: &str) -> bool {
        self.limiter.allow(action_key)
    }

    /// Checks an action against an explicit rate-limit window.
    pub fn allow_with(&self, action_key: &str, max_per_window: u32, window_ms: u64) -> bool {
        self.limiter.allow_with(action_key, max_per_window, window_ms)
    }

    /// Validates a reported dice roll.
    pub fn validate_dice(&self, dice: &[u8]) -> ValidationVerdict {
        self.validator.validate_dice(dice)
    }

    /// Validates the structural plausibility of a loaded game state.
    pub fn validate_loaded_state(&self, snapshot: &GameStateSnapshot) -> ValidationVerdict {
        self.validator.validate_loaded_state(snapshot)
    }

    /// Validates a client-reported action time against the local clock.
    pub fn validate_event_time(&self, claimed_ms: u64) -> ValidationVerdict {
        self.validator.validate_event_time(claimed_ms)
    }

    /// Compares the local balance against a fetched authoritative one.
    pub fn check_balance(&self, local: f64, remote: f64) -> ReconcileOutcome {
        self.reconciler.check(local, remote)
    }

    /// The audit trail. Query and clear through this handle; gating
    /// `clear` behind authorization is the caller's responsibility.
    #[must_use]
    pub fn audit(&self) -> &AuditLog<B> {
        &self.audit
    }
}
