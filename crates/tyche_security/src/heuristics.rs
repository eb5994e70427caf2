//! # Anti-Cheat Heuristics
//!
//! Stateless rule evaluation over a snapshot of reported game facts.
//!
//! Every rule is evaluated on every call and every violated rule is
//! reported - a snapshot that trips three ceilings yields three
//! violations, not one. The engine flags; it never mutates state or
//! rejects anything. What happens to a suspicious snapshot (clamp,
//! ignore, force re-sync with the server) is the caller's policy.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use tyche_shared::constants;
use tyche_shared::events::{EventSink, SecurityEventKind};
use tyche_shared::snapshot::GameStateSnapshot;

/// Ceilings and tolerances for the heuristic rules.
///
/// Defaults are the shipped design values; deployments override them
/// from the `[heuristics]` table of the runtime config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicsConfig {
    /// Rule 1: maximum plausible balance.
    pub max_balance: f64,
    /// Rule 2: maximum plausible single-bet payout.
    pub max_single_payout: f64,
    /// Rule 3: ceiling on the lifetime wagered counter.
    pub max_lifetime_wagered: f64,
    /// Rule 4: experience points required per level.
    pub xp_per_level: f64,
    /// Rule 4: levels of slack before a level/xp mismatch fires.
    pub level_tolerance: f64,
}

impl Default for HeuristicsConfig {
    fn default() -> Self {
        Self {
            max_balance: constants::MAX_BALANCE,
            max_single_payout: constants::MAX_SINGLE_PAYOUT,
            max_lifetime_wagered: constants::MAX_LIFETIME_WAGERED,
            xp_per_level: constants::XP_PER_LEVEL,
            level_tolerance: constants::LEVEL_TOLERANCE,
        }
    }
}

impl HeuristicsConfig {
    /// Parses a config from a TOML document.
    ///
    /// Absent keys keep their design defaults.
    ///
    /// # Errors
    ///
    /// Returns the TOML parse error for a malformed document.
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}

/// One violated rule.
#[derive(Clone, Debug, PartialEq)]
pub enum Violation {
    /// Balance exceeds the configured ceiling.
    BalanceCeiling {
        /// Reported balance.
        balance: f64,
        /// Configured ceiling.
        ceiling: f64,
    },
    /// Biggest win exceeds the maximum single-bet payout.
    PayoutCeiling {
        /// Reported biggest win.
        biggest_win: f64,
        /// Configured ceiling.
        ceiling: f64,
    },
    /// Lifetime wagered exceeds the extreme ceiling.
    WagerCeiling {
        /// Reported lifetime wagered.
        total_wagered: f64,
        /// Configured ceiling.
        ceiling: f64,
    },
    /// Reported level outruns what the experience total supports.
    LevelMismatch {
        /// Reported level.
        level: f64,
        /// Level the experience total supports.
        expected: f64,
    },
    /// A counter that must never go negative did.
    NegativeValue {
        /// Which field.
        field: &'static str,
        /// The offending value.
        value: f64,
    },
    /// A reported figure is NaN or infinite.
    NonFinite {
        /// Which field.
        field: &'static str,
    },
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BalanceCeiling { balance, ceiling } => {
                write!(f, "balance {balance} exceeds ceiling {ceiling}")
            }
            Self::PayoutCeiling { biggest_win, ceiling } => {
                write!(f, "biggest win {biggest_win} exceeds max payout {ceiling}")
            }
            Self::WagerCeiling { total_wagered, ceiling } => {
                write!(f, "lifetime wagered {total_wagered} exceeds ceiling {ceiling}")
            }
            Self::LevelMismatch { level, expected } => {
                write!(f, "level {level} inconsistent with xp (expected ~{expected})")
            }
            Self::NegativeValue { field, value } => {
                write!(f, "{field} is negative ({value})")
            }
            Self::NonFinite { field } => write!(f, "{field} is not a finite number"),
        }
    }
}

/// Outcome of one evaluation.
#[derive(Clone, Debug, PartialEq)]
pub struct HeuristicsReport {
    /// True when at least one rule fired.
    pub suspicious: bool,
    /// Every violated rule, in rule order.
    pub violations: Vec<Violation>,
}

impl HeuristicsReport {
    /// Human-readable violation descriptions, for payloads and UI.
    #[must_use]
    pub fn violation_strings(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

/// The rule evaluator.
///
/// Evaluation itself is pure and deterministic: identical snapshots
/// yield identical reports. As the documented reference behavior, the
/// engine additionally emits one [`SecurityEventKind::AntiCheatTriggered`]
/// event through its sink per suspicious evaluation.
pub struct HeuristicsEngine {
    config: HeuristicsConfig,
    sink: Arc<dyn EventSink>,
}

impl HeuristicsEngine {
    /// Creates an engine with the given ceilings.
    #[must_use]
    pub fn new(config: HeuristicsConfig, sink: Arc<dyn EventSink>) -> Self {
        Self { config, sink }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &HeuristicsConfig {
        &self.config
    }

    /// Judges a snapshot against every rule.
    pub fn evaluate(&self, snapshot: &GameStateSnapshot) -> HeuristicsReport {
        let mut violations = Vec::new();

        // A NaN or infinity poisons every comparison below, so flag it
        // first; the remaining rules compare false against NaN and stay
        // quiet rather than double-reporting.
        for (field, value) in snapshot.fields() {
            if !value.is_finite() {
                violations.push(Violation::NonFinite { field });
            }
        }

        if snapshot.balance > self.config.max_balance {
            violations.push(Violation::BalanceCeiling {
                balance: snapshot.balance,
                ceiling: self.config.max_balance,
            });
        }

        if snapshot.biggest_win > self.config.max_single_payout {
            violations.push(Violation::PayoutCeiling {
                biggest_win: snapshot.biggest_win,
                ceiling: self.config.max_single_payout,
            });
        }

        if snapshot.total_wagered > self.config.max_lifetime_wagered {
            violations.push(Violation::WagerCeiling {
                total_wagered: snapshot.total_wagered,
                ceiling: self.config.max_lifetime_wagered,
            });
        }

        let expected_level = (snapshot.xp / self.config.xp_per_level).floor();
        if snapshot.level > expected_level + self.config.level_tolerance {
            violations.push(Violation::LevelMismatch {
                level: snapshot.level,
                expected: expected_level,
            });
        }

        for (field, value) in [
            ("balance", snapshot.balance),
            ("totalWagered", snapshot.total_wagered),
            ("xp", snapshot.xp),
        ] {
            if value < 0.0 {
                violations.push(Violation::NegativeValue { field, value });
            }
        }

        let report = HeuristicsReport {
            suspicious: !violations.is_empty(),
            violations,
        };

        if report.suspicious {
            self.sink.record(
                SecurityEventKind::AntiCheatTriggered,
                json!({
                    "snapshot": snapshot,
                    "violations": report.violation_strings(),
                }),
            );
        }

        report
    }
}
