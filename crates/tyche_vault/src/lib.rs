//! # TYCHE Vault - Tamper-Evident Local Persistence
//!
//! Lets the client keep progress between sessions while making casual
//! edits to the stored copy detectable.
//!
//! ## Architecture
//!
//! ```text
//! save(key, value)                      load(key, default)
//!     │                                     │
//!     ▼                                     ▼
//! serialize ──► checksum ──► encode     read envelope
//!     │                         │           │
//!     │                         ▼           ▼
//!     │                   ┌───────────┐  decode ──► verify ──► deserialize
//!     └──────────────────►│ Envelope  │     │failure      │mismatch
//!                         │ (JSON KV) │     ▼             ▼
//!                         └───────────┘  log event ► delete ► default
//! ```
//!
//! ## Security model
//!
//! This layer is obfuscation plus tamper-evidence, not a cryptographic
//! boundary: the transform key ships inside the binary and the checksum
//! is a weak rolling hash. True authority over balances lives on the
//! server; the vault only guarantees that a casually edited save is
//! detected, audited, and reset instead of trusted.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod checksum;
pub mod codec;
pub mod envelope;
pub mod error;
pub mod storage;
pub mod store;

pub use envelope::SecureEnvelope;
pub use error::{VaultError, VaultResult};
pub use storage::{FileBackend, MemoryBackend, StorageBackend};
pub use store::SecureStore;
