//! The numeric game facts judged by the anti-cheat rules.

use serde::{Deserialize, Serialize};

/// A point-in-time view of the figures the client reports.
///
/// Fields are `f64` because the hosting client stores them as doubles.
/// By invariant every field is finite and non-negative; the heuristics
/// engine reports violations of that invariant as rule failures rather
/// than panicking, so a hand-edited save can never crash the evaluator.
///
/// This type is an input to the subsystem - it is never persisted by the
/// subsystem itself.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateSnapshot {
    /// Spendable balance in currency units.
    pub balance: f64,
    /// Lifetime sum of wagers. Monotonically increasing.
    pub total_wagered: f64,
    /// Largest single payout ever received.
    pub biggest_win: f64,
    /// Reported player level.
    pub level: f64,
    /// Accumulated experience points.
    pub xp: f64,
}

impl GameStateSnapshot {
    /// All five reported figures, paired with their field names.
    ///
    /// Rule evaluation iterates this instead of repeating field lists.
    #[must_use]
    pub fn fields(&self) -> [(&'static str, f64); 5] {
        [
            ("balance", self.balance),
            ("totalWagered", self.total_wagered),
            ("biggestWin", self.biggest_win),
            ("level", self.level),
            ("xp", self.xp),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_json_uses_camel_case() {
        let snapshot = GameStateSnapshot {
            balance: 100.0,
            total_wagered: 500.0,
            biggest_win: 50.0,
            level: 2.0,
            xp: 2000.0,
        };
        let json = serde_json::to_value(snapshot).unwrap();
        assert_eq!(json["totalWagered"], 500.0);
        assert_eq!(json["biggestWin"], 50.0);
    }

    #[test]
    fn test_fields_cover_every_figure() {
        let snapshot = GameStateSnapshot {
            balance: 1.0,
            total_wagered: 2.0,
            biggest_win: 3.0,
            level: 4.0,
            xp: 5.0,
        };
        let names: Vec<&str> = snapshot.fields().iter().map(|(n, _)| *n).collect();
        assert_eq!(
            names,
            vec!["balance", "totalWagered", "biggestWin", "level", "xp"]
        );
    }
}
