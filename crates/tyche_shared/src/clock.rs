//! Wall-clock access for event timestamps and checksum salts.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current time as epoch milliseconds.
///
/// Clamps to zero if the system clock reads before the epoch; the
/// subsystem degrades to salt `0000` rather than panicking.
#[must_use]
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}
