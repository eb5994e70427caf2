//! # Input Validation
//!
//! Structural checks on client-reported inputs before gameplay code
//! trusts them: dice faces, freshly loaded saves, and action timestamps.
//!
//! Like the heuristics engine, validators report and audit but never
//! reject on their own authority - the verdict goes back to the caller.

use std::sync::Arc;

use serde_json::json;

use tyche_shared::clock;
use tyche_shared::constants;
use tyche_shared::events::{EventSink, SecurityEventKind};
use tyche_shared::snapshot::GameStateSnapshot;

/// Result of a validation check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationVerdict {
    /// The input is structurally plausible.
    Valid,
    /// The input is implausible; an audit event was emitted.
    Invalid,
}

impl ValidationVerdict {
    /// True for [`ValidationVerdict::Valid`].
    #[must_use]
    pub const fn is_valid(self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Validator for client-reported inputs.
pub struct InputValidator {
    sink: Arc<dyn EventSink>,
    max_future_skew_ms: u64,
    max_event_age_ms: u64,
}

impl InputValidator {
    /// Creates a validator with the shipped skew tolerances.
    #[must_use]
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            sink,
            max_future_skew_ms: constants::MAX_FUTURE_SKEW_MS,
            max_event_age_ms: constants::MAX_EVENT_AGE_MS,
        }
    }

    /// Checks a reported dice roll: exactly the expected number of dice,
    /// every face on the die.
    ///
    /// Emits [`SecurityEventKind::InvalidDiceValues`] with the offending
    /// values on failure.
    pub fn validate_dice(&self, dice: &[u8]) -> ValidationVerdict {
        let count_ok = dice.len() == constants::DICE_PER_ROLL;
        let faces_ok = dice
            .iter()
            .all(|&d| (constants::DIE_MIN..=constants::DIE_MAX).contains(&d));
        if count_ok && faces_ok {
            return ValidationVerdict::Valid;
        }
        self.sink.record(
            SecurityEventKind::InvalidDiceValues,
            json!({
                "dice": dice,
                "expectedCount": constants::DICE_PER_ROLL,
            }),
        );
        ValidationVerdict::Invalid
    }

    /// Checks the structural plausibility of a freshly loaded save:
    /// every figure finite and non-negative.
    ///
    /// Ceiling and level/xp consistency belong to the heuristics engine;
    /// this check only answers "is this shaped like a game state at
    /// all". Emits [`SecurityEventKind::InvalidGameState`] with the
    /// failing fields.
    pub fn validate_loaded_state(&self, snapshot: &GameStateSnapshot) -> ValidationVerdict {
        let broken: Vec<&'static str> = snapshot
            .fields()
            .iter()
            .filter(|(_, v)| !v.is_finite() || *v < 0.0)
            .map(|(field, _)| *field)
            .collect();
        if broken.is_empty() {
            return ValidationVerdict::Valid;
        }
        self.sink.record(
            SecurityEventKind::InvalidGameState,
            json!({
                "snapshot": snapshot,
                "fields": broken,
            }),
        );
        ValidationVerdict::Invalid
    }

    /// Checks a client-reported action time against the local clock.
    pub fn validate_event_time(&self, claimed_ms: u64) -> ValidationVerdict {
        self.validate_event_time_at(claimed_ms, clock::now_millis())
    }

    /// Clock-injected form of [`Self::validate_event_time`].
    ///
    /// A claimed time further in the future than the skew allowance, or
    /// older than the acceptance window, is implausible and emits
    /// [`SecurityEventKind::SuspiciousTimestamp`] with both times.
    pub fn validate_event_time_at(&self, claimed_ms: u64, now_ms: u64) -> ValidationVerdict {
        let too_far_ahead = claimed_ms > now_ms.saturating_add(self.max_future_skew_ms);
        let too_old = claimed_ms < now_ms.saturating_sub(self.max_event_age_ms);
        if !too_far_ahead && !too_old {
            return ValidationVerdict::Valid;
        }
        self.sink.record(
            SecurityEventKind::SuspiciousTimestamp,
            json!({
                "claimed": claimed_ms,
                "observed": now_ms,
            }),
        );
        ValidationVerdict::Invalid
    }
}
