//! # Rate Limiting
//!
//! Per-action sliding-window throttling for burst-prone operations
//! (roll requests, save spam, reconcile polling).
//!
//! State is process-lifetime only: windows reset with the session. This
//! is a traffic-shaping aid, not a durable record, and it is not a
//! security boundary on its own - the server enforces real limits.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use tyche_shared::clock;
use tyche_shared::constants;
use tyche_shared::events::{EventSink, SecurityEventKind};

/// Default window parameters.
///
/// Deployments override them from the `[rate_limit]` table of the
/// runtime config; per-call overrides go through
/// [`RateLimiter::allow_with`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum invocations of one action per window.
    pub max_per_window: u32,
    /// Sliding-window length in milliseconds.
    pub window_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_per_window: constants::RATE_LIMIT_MAX_ACTIONS,
            window_ms: constants::RATE_LIMIT_WINDOW_MS,
        }
    }
}

/// Sliding-window counter per action key.
///
/// Keys are independent: throttling "roll" never affects "save". The
/// mutex makes the limiter safe on a threaded host; the reference host
/// is a single-threaded event loop.
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Mutex<HashMap<String, Vec<u64>>>,
    sink: Arc<dyn EventSink>,
}

impl RateLimiter {
    /// Creates a limiter with the given defaults.
    #[must_use]
    pub fn new(config: RateLimitConfig, sink: Arc<dyn EventSink>) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
            sink,
        }
    }

    /// Checks `action_key` against the configured default window.
    ///
    /// Returns `true` and records the invocation when the action is
    /// allowed; returns `false` and emits one
    /// [`SecurityEventKind::RateLimitExceeded`] when the window is full.
    pub fn allow(&self, action_key: &str) -> bool {
        self.allow_with(action_key, self.config.max_per_window, self.config.window_ms)
    }

    /// Checks `action_key` against an explicit window.
    pub fn allow_with(&self, action_key: &str, max_per_window: u32, window_ms: u64) -> bool {
        self.allow_at(action_key, max_per_window, window_ms, clock::now_millis())
    }

    /// Clock-injected core. Prune, then count, then record.
    fn allow_at(&self, action_key: &str, max_per_window: u32, window_ms: u64, now_ms: u64) -> bool {
        let mut windows = self.windows.lock();
        let window = windows.entry(action_key.to_owned()).or_default();
        window.retain(|&stamp| now_ms.saturating_sub(stamp) < window_ms);

        if window.len() >= max_per_window as usize {
            self.sink.record(
                SecurityEventKind::RateLimitExceeded,
                json!({
                    "action": action_key,
                    "count": window.len(),
                    "maxPerWindow": max_per_window,
                    "windowMs": window_ms,
                }),
            );
            return false;
        }

        window.push(now_ms);
        true
    }
}
