//! # Runtime Configuration
//!
//! One TOML document configures the whole subsystem:
//!
//! ```toml
//! [heuristics]
//! max_balance = 10000000.0
//! level_tolerance = 5.0
//!
//! [rate_limit]
//! max_per_window = 60
//! window_ms = 60000
//! ```
//!
//! Every key is optional; absent keys keep the shipped design defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tyche_security::heuristics::HeuristicsConfig;
use tyche_security::rate_limit::RateLimitConfig;

/// Errors loading the runtime configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    Read(String),

    /// The config document could not be parsed.
    #[error("failed to parse config: {0}")]
    Parse(String),
}

/// Subsystem-wide configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrityConfig {
    /// Anti-cheat ceilings and tolerances.
    pub heuristics: HeuristicsConfig,
    /// Default rate-limit window.
    pub rate_limit: RateLimitConfig,
}

impl IntegrityConfig {
    /// Parses a configuration from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for a malformed document.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Loads a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read and
    /// [`ConfigError::Parse`] when its contents are malformed.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Read(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_toml_str(&raw)
    }
}
