//! # Secure Store
//!
//! Orchestrates codec + checksum to persist and restore versioned
//! envelopes, and owns the tamper-response policy.
//!
//! ## Philosophy
//!
//! NEVER trust the local copy. A record that fails to decode or to
//! verify is unrecoverable by definition: we log it, delete it, and hand
//! the caller their default. A corrupted save cannot crash the loader
//! and cannot silently resurrect.
//!
//! No error escapes `save` or `load`. A failed save means state simply
//! did not persist this time; callers must not assume it did.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use tyche_shared::clock;
use tyche_shared::events::{EventSink, SecurityEventKind};

use crate::checksum;
use crate::codec;
use crate::envelope::SecureEnvelope;
use crate::error::{VaultError, VaultResult};
use crate::storage::StorageBackend;

/// Tamper-evident persistence for one key/value store.
///
/// The store owns envelope lifecycle exclusively: nothing else writes
/// the raw persisted records.
pub struct SecureStore<B> {
    backend: Arc<B>,
    sink: Arc<dyn EventSink>,
}

impl<B: StorageBackend> SecureStore<B> {
    /// Creates a store over `backend`, reporting security events to
    /// `sink`.
    #[must_use]
    pub fn new(backend: Arc<B>, sink: Arc<dyn EventSink>) -> Self {
        Self { backend, sink }
    }

    /// Persists `value` under `key`.
    ///
    /// Serializes to plaintext, checksums it, encodes it, and writes the
    /// envelope. Serialization and storage failures are logged, audited
    /// as [`SecurityEventKind::StorageFailure`], and swallowed.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) {
        let plaintext = match serde_json::to_string(value) {
            Ok(plaintext) => plaintext,
            Err(e) => {
                let err = VaultError::Serialization(e.to_string());
                self.report_save_failure(key, "serialize", &err);
                return;
            }
        };

        let written_at = clock::now_millis();
        let envelope = SecureEnvelope::new(
            codec::encode(&plaintext),
            checksum::checksum(&plaintext, written_at),
            written_at,
        );

        // Envelope fields are plain strings and integers; serializing
        // them cannot fail, but the policy is the same if it ever does.
        let record = match serde_json::to_string(&envelope) {
            Ok(record) => record,
            Err(e) => {
                let err = VaultError::Serialization(e.to_string());
                self.report_save_failure(key, "envelope", &err);
                return;
            }
        };

        if let Err(err) = self.backend.set(key, &record) {
            self.report_save_failure(key, "write", &err);
        }
    }

    /// Restores the value under `key`, or `default` when the key is
    /// absent or its record fails integrity checks.
    ///
    /// On decode failure or checksum mismatch the tamper-response policy
    /// runs: emit [`SecurityEventKind::TamperingDetected`], delete the
    /// record, return `default`. A never-written key returns `default`
    /// with no event.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let record = match self.backend.get(key) {
            Ok(Some(record)) => record,
            Ok(None) => return default,
            Err(err) => {
                tracing::warn!(key, error = %err, "secure store read failed");
                self.sink.record(
                    SecurityEventKind::StorageFailure,
                    json!({ "key": key, "stage": "read", "error": err.to_string() }),
                );
                return default;
            }
        };

        let envelope: SecureEnvelope = match serde_json::from_str(&record) {
            Ok(envelope) => envelope,
            Err(e) => {
                // A record exists but is not an envelope - treat as
                // tampering and enter the same fail-closed path.
                self.tamper_response(key, &VaultError::Decode(format!("malformed envelope: {e}")));
                return default;
            }
        };

        if !envelope.is_current_version() {
            // Reserved for migration. A newer client may have written
            // this; leave the record alone and fall back to default.
            tracing::warn!(key, version = envelope.version, "unknown envelope version");
            return default;
        }

        let plaintext = match Self::recover_plaintext(&envelope) {
            Ok(plaintext) => plaintext,
            Err(err) => {
                self.tamper_response(key, &err);
                return default;
            }
        };

        match serde_json::from_str(&plaintext) {
            Ok(value) => value,
            Err(e) => {
                // The checksum vouched for these bytes, so this is
                // schema drift, not tampering. Keep the record for a
                // future migration and fall back to default.
                tracing::warn!(key, error = %e, "verified plaintext no longer deserializes");
                default
            }
        }
    }

    /// Decodes the ciphertext and verifies the checksum against the
    /// recovered plaintext. Decode failure fails closed: it is never
    /// treated as "valid but empty".
    fn recover_plaintext(envelope: &SecureEnvelope) -> VaultResult<String> {
        let plaintext = codec::decode(&envelope.ciphertext)?;
        if !checksum::verify(&plaintext, &envelope.checksum) {
            return Err(VaultError::Integrity(
                "checksum does not match recovered plaintext".to_owned(),
            ));
        }
        Ok(plaintext)
    }

    /// The fixed sequence for a corrupted record: log, delete, and let
    /// the caller's default take over.
    fn tamper_response(&self, key: &str, reason: &VaultError) {
        tracing::warn!(key, reason = %reason, "tampering detected, resetting record");
        self.sink.record(
            SecurityEventKind::TamperingDetected,
            json!({
                "key": key,
                "reason": reason.to_string(),
                "detectedAt": clock::now_millis(),
            }),
        );
        if let Err(e) = self.backend.remove(key) {
            tracing::warn!(key, error = %e, "failed to erase corrupted record");
        }
    }

    /// Logs and audits a swallowed save failure.
    fn report_save_failure(&self, key: &str, stage: &str, err: &VaultError) {
        tracing::warn!(key, stage, error = %err, "secure store save failed");
        self.sink.record(
            SecurityEventKind::StorageFailure,
            json!({ "key": key, "stage": stage, "error": err.to_string() }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;
    use serde::Deserialize;
    use tyche_shared::events::MemorySink;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct SaveSlot {
        balance: f64,
        rolls: u32,
    }

    fn fixture() -> (Arc<MemoryBackend>, Arc<MemorySink>, SecureStore<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        let sink = Arc::new(MemorySink::new());
        let store = SecureStore::new(Arc::clone(&backend), sink.clone() as Arc<dyn EventSink>);
        (backend, sink, store)
    }

    fn default_slot() -> SaveSlot {
        SaveSlot {
            balance: 1000.0,
            rolls: 0,
        }
    }

    #[test]
    fn test_round_trip() {
        let (_, sink, store) = fixture();
        let slot = SaveSlot {
            balance: 2534.75,
            rolls: 17,
        };
        store.save("slot", &slot);
        assert_eq!(store.load("slot", default_slot()), slot);
        assert!(sink.recorded().is_empty());
    }

    #[test]
    fn test_absent_key_returns_default_silently() {
        let (_, sink, store) = fixture();
        assert_eq!(store.load("never-written", default_slot()), default_slot());
        assert!(sink.recorded().is_empty());
    }

    #[test]
    fn test_stored_record_is_opaque() {
        let (backend, _, store) = fixture();
        store.save("slot", &default_slot());
        let record = backend.get("slot").unwrap().unwrap();
        let envelope: SecureEnvelope = serde_json::from_str(&record).unwrap();
        assert!(!envelope.ciphertext.contains("balance"));
        assert!(envelope.is_current_version());
    }

    #[test]
    fn test_tampered_ciphertext_resets_and_audits() {
        let (backend, sink, store) = fixture();
        store.save("slot", &SaveSlot { balance: 9.0, rolls: 1 });

        let record = backend.get("slot").unwrap().unwrap();
        let mut envelope: SecureEnvelope = serde_json::from_str(&record).unwrap();
        let mut chars: Vec<char> = envelope.ciphertext.chars().collect();
        chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
        envelope.ciphertext = chars.into_iter().collect();
        backend
            .set("slot", &serde_json::to_string(&envelope).unwrap())
            .unwrap();

        assert_eq!(store.load("slot", default_slot()), default_slot());
        assert_eq!(sink.count_of(&SecurityEventKind::TamperingDetected), 1);
        // The corrupted record was erased, not left for a retry.
        assert_eq!(backend.get("slot").unwrap(), None);
    }

    #[test]
    fn test_tampered_checksum_hash_resets_and_audits() {
        let (backend, sink, store) = fixture();
        store.save("slot", &default_slot());

        let record = backend.get("slot").unwrap().unwrap();
        let mut envelope: SecureEnvelope = serde_json::from_str(&record).unwrap();
        let mut bytes = envelope.checksum.into_bytes();
        bytes[0] = if bytes[0] == b'0' { b'1' } else { b'0' };
        envelope.checksum = String::from_utf8(bytes).unwrap();
        backend
            .set("slot", &serde_json::to_string(&envelope).unwrap())
            .unwrap();

        assert_eq!(store.load("slot", default_slot()), default_slot());
        assert_eq!(sink.count_of(&SecurityEventKind::TamperingDetected), 1);
        assert_eq!(backend.get("slot").unwrap(), None);
    }

    #[test]
    fn test_non_envelope_record_is_treated_as_tampering() {
        let (backend, sink, store) = fixture();
        backend.set("slot", "{\"free\":\"money\"}").unwrap();

        assert_eq!(store.load("slot", default_slot()), default_slot());
        assert_eq!(sink.count_of(&SecurityEventKind::TamperingDetected), 1);
        assert_eq!(backend.get("slot").unwrap(), None);
    }

    #[test]
    fn test_schema_drift_keeps_record() {
        #[derive(Serialize)]
        struct OldSlot {
            nickname: String,
        }

        let (backend, sink, store) = fixture();
        store.save(
            "slot",
            &OldSlot {
                nickname: "high-roller".to_owned(),
            },
        );

        // Integrity holds but the type no longer matches - default,
        // no tamper event, record preserved for migration.
        assert_eq!(store.load("slot", default_slot()), default_slot());
        assert_eq!(sink.count_of(&SecurityEventKind::TamperingDetected), 0);
        assert!(backend.get("slot").unwrap().is_some());
    }

    #[test]
    fn test_unknown_version_returns_default_without_deleting() {
        let (backend, sink, store) = fixture();
        store.save("slot", &default_slot());

        let record = backend.get("slot").unwrap().unwrap();
        let mut envelope: SecureEnvelope = serde_json::from_str(&record).unwrap();
        envelope.version = 99;
        backend
            .set("slot", &serde_json::to_string(&envelope).unwrap())
            .unwrap();

        assert_eq!(store.load("slot", default_slot()), default_slot());
        assert_eq!(sink.recorded().len(), 0);
        assert!(backend.get("slot").unwrap().is_some());
    }

    #[test]
    fn test_overwrite_replaces_previous_value() {
        let (_, _, store) = fixture();
        store.save("slot", &SaveSlot { balance: 1.0, rolls: 1 });
        store.save("slot", &SaveSlot { balance: 2.0, rolls: 2 });
        assert_eq!(
            store.load("slot", default_slot()),
            SaveSlot { balance: 2.0, rolls: 2 }
        );
    }

    #[test]
    fn test_keys_are_independent() {
        let (_, _, store) = fixture();
        store.save("a", &SaveSlot { balance: 1.0, rolls: 1 });
        store.save("b", &SaveSlot { balance: 2.0, rolls: 2 });
        assert_eq!(store.load("a", default_slot()).balance, 1.0);
        assert_eq!(store.load("b", default_slot()).balance, 2.0);
    }
}
