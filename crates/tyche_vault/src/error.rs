//! # Vault Error Types
//!
//! All errors that can occur in the persistence stack.
//!
//! None of these escape `save`/`load` on [`crate::SecureStore`]: decode
//! and integrity failures recover into the tamper-response policy, and
//! serialization/storage failures are logged and swallowed. The typed
//! forms exist so the internal plumbing can use `?` and so tests can
//! assert on exact failure classes.

use thiserror::Error;

/// Errors that can occur in the vault.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    /// Stored ciphertext is not validly encoded.
    #[error("decode failed: {0}")]
    Decode(String),

    /// Recovered plaintext does not match the stored checksum.
    #[error("integrity check failed: {0}")]
    Integrity(String),

    /// A value could not round-trip through the wire format.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The underlying key/value store could not read or write.
    #[error("storage failed: {0}")]
    Storage(String),
}

/// Result type for vault operations.
pub type VaultResult<T> = Result<T, VaultError>;
