//! # Integrity Subsystem Constants
//!
//! Design ceilings and storage keys for the TYCHE client.
//!
//! **CRITICAL:** These values are baked into the client binary.
//! Changes require a client rebuild. None of them are authoritative -
//! the server re-validates everything the client reports.

// =============================================================================
// ANTI-CHEAT CEILINGS
// =============================================================================

/// Maximum plausible balance in currency units.
pub const MAX_BALANCE: f64 = 10_000_000.0;

/// Maximum bet accepted by the game.
pub const MAX_BET: f64 = 3_000.0;

/// Maximum odds multiplier any single roll can pay.
pub const MAX_PAYOUT_ODDS: f64 = 100.0;

/// Maximum plausible single-bet payout (max bet x max odds).
pub const MAX_SINGLE_PAYOUT: f64 = MAX_BET * MAX_PAYOUT_ODDS;

/// Ceiling on lifetime wagered. Intentionally loose - this counter
/// accumulates over the whole play history.
pub const MAX_LIFETIME_WAGERED: f64 = 1_000_000_000.0;

/// Experience points required per level.
pub const XP_PER_LEVEL: f64 = 1_000.0;

/// Levels of slack allowed between reported level and the level the
/// experience total supports.
pub const LEVEL_TOLERANCE: f64 = 5.0;

// =============================================================================
// DICE RULES
// =============================================================================

/// Number of dice in one roll.
pub const DICE_PER_ROLL: usize = 2;

/// Lowest face on a die.
pub const DIE_MIN: u8 = 1;

/// Highest face on a die.
pub const DIE_MAX: u8 = 6;

// =============================================================================
// TIMESTAMP PLAUSIBILITY
// =============================================================================

/// How far into the future a client-reported action time may drift
/// before it is flagged (clock skew allowance).
pub const MAX_FUTURE_SKEW_MS: u64 = 60_000;

/// Oldest client-reported action time accepted (24 hours).
pub const MAX_EVENT_AGE_MS: u64 = 86_400_000;

// =============================================================================
// RATE LIMITING
// =============================================================================

/// Default maximum invocations of one action per window.
pub const RATE_LIMIT_MAX_ACTIONS: u32 = 60;

/// Default sliding-window length in milliseconds.
pub const RATE_LIMIT_WINDOW_MS: u64 = 60_000;

// =============================================================================
// STORAGE
// =============================================================================

/// Well-known key the audit log persists under.
pub const AUDIT_LOG_KEY: &str = "tyche::security_audit_log";

/// Maximum events retained in the audit log.
pub const AUDIT_LOG_CAPACITY: usize = 100;

/// Current envelope format version.
pub const ENVELOPE_VERSION: u32 = 1;

// =============================================================================
// RECONCILIATION
// =============================================================================

/// Largest local-vs-remote balance difference treated as rounding noise.
pub const BALANCE_EPSILON: f64 = 0.01;
