//! # Secure Envelope
//!
//! The versioned record written to storage for one logical key.
//!
//! ## Format (JSON, camelCase)
//!
//! ```text
//! {
//!   "ciphertext": "...",   codec output of the serialized plaintext
//!   "checksum":   "...",   hash || salt over the PLAINTEXT
//!   "version":    1,       reserved for future migration
//!   "writtenAt":  ...      epoch millis at creation
//! }
//! ```
//!
//! The checksum covers the exact plaintext that was encoded into
//! `ciphertext`. Verification decodes the ciphertext and checksums the
//! recovered plaintext; it never re-serializes anything.

use serde::{Deserialize, Serialize};

use tyche_shared::constants::ENVELOPE_VERSION;

/// The unit of persisted state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecureEnvelope {
    /// Codec output of the serialized plaintext.
    pub ciphertext: String,
    /// Verifier output over the plaintext, `hash || salt`.
    pub checksum: String,
    /// Envelope format version.
    pub version: u32,
    /// Creation time, epoch milliseconds.
    pub written_at: u64,
}

impl SecureEnvelope {
    /// Builds a current-version envelope.
    #[must_use]
    pub fn new(ciphertext: String, checksum: String, written_at: u64) -> Self {
        Self {
            ciphertext,
            checksum,
            version: ENVELOPE_VERSION,
            written_at,
        }
    }

    /// Whether this envelope was written by a format this client knows.
    #[must_use]
    pub fn is_current_version(&self) -> bool {
        self.version == ENVELOPE_VERSION
    }
}
