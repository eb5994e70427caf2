//! # Storage Backends
//!
//! The key/value store underneath the secure store and the audit log.
//!
//! The hosting environment provides a synchronous string-keyed,
//! string-valued store. [`StorageBackend`] is the seam: components are
//! generic over it, tests run against [`MemoryBackend`], and a desktop
//! host persists through [`FileBackend`] (one JSON file holding the
//! whole map, rewritten per set - event volume is low and records are
//! small, so simplicity wins over write efficiency).

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::{VaultError, VaultResult};

/// Synchronous key/value store for string records.
///
/// Implementations must tolerate interleaved calls on different keys;
/// callers get no atomicity across keys.
pub trait StorageBackend: Send + Sync {
    /// Reads the record under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Storage`] when the underlying read fails.
    fn get(&self, key: &str) -> VaultResult<Option<String>>;

    /// Writes `value` under `key`, replacing any existing record.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Storage`] when the underlying write fails
    /// (e.g. quota exceeded).
    fn set(&self, key: &str, value: &str) -> VaultResult<()>;

    /// Deletes the record under `key`. Deleting a missing key is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Storage`] when the underlying delete fails.
    fn remove(&self, key: &str) -> VaultResult<()>;
}

/// In-memory backend. The default for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> VaultResult<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> VaultResult<()> {
        self.entries.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> VaultResult<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// Single-file backend: the whole key/value map as one JSON document.
///
/// Reads are served from the in-memory cache; every mutation rewrites
/// the file. Suitable for the low write volume of save slots plus the
/// audit log.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    cache: Mutex<HashMap<String, String>>,
}

impl FileBackend {
    /// Opens the backend, loading any existing map from `path`.
    ///
    /// A missing file starts empty; an unreadable or unparseable file is
    /// a storage error - the caller decides whether to start fresh.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Storage`] when the file exists but cannot
    /// be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> VaultResult<Self> {
        let path = path.as_ref().to_path_buf();
        let cache = if path.exists() {
            let raw = fs::read_to_string(&path)
                .map_err(|e| VaultError::Storage(format!("failed to read {}: {e}", path.display())))?;
            serde_json::from_str(&raw)
                .map_err(|e| VaultError::Storage(format!("corrupt store {}: {e}", path.display())))?
        } else {
            HashMap::new()
        };
        Ok(Self {
            path,
            cache: Mutex::new(cache),
        })
    }

    /// Serializes the map and rewrites the backing file.
    fn flush(&self, cache: &HashMap<String, String>) -> VaultResult<()> {
        let raw = serde_json::to_string(cache)
            .map_err(|e| VaultError::Storage(format!("failed to serialize store: {e}")))?;
        fs::write(&self.path, raw)
            .map_err(|e| VaultError::Storage(format!("failed to write {}: {e}", self.path.display())))
    }
}

impl StorageBackend for FileBackend {
    fn get(&self, key: &str) -> VaultResult<Option<String>> {
        Ok(self.cache.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> VaultResult<()> {
        let mut cache = self.cache.lock();
        cache.insert(key.to_owned(), value.to_owned());
        self.flush(&cache)
    }

    fn remove(&self, key: &str) -> VaultResult<()> {
        let mut cache = self.cache.lock();
        if cache.remove(key).is_some() {
            self.flush(&cache)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store_path() -> PathBuf {
        let id = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("tyche_store_{id}.json"))
    }

    #[test]
    fn test_memory_backend_round_trip() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.get("k").unwrap(), None);
        backend.set("k", "v").unwrap();
        assert_eq!(backend.get("k").unwrap(), Some("v".to_owned()));
        backend.remove("k").unwrap();
        assert_eq!(backend.get("k").unwrap(), None);
    }

    #[test]
    fn test_remove_missing_key_is_ok() {
        let backend = MemoryBackend::new();
        backend.remove("never-written").unwrap();
    }

    #[test]
    fn test_file_backend_survives_reopen() {
        let path = temp_store_path();
        {
            let backend = FileBackend::open(&path).unwrap();
            backend.set("slot", "envelope-json").unwrap();
        }
        {
            let backend = FileBackend::open(&path).unwrap();
            assert_eq!(backend.get("slot").unwrap(), Some("envelope-json".to_owned()));
            backend.remove("slot").unwrap();
        }
        {
            let backend = FileBackend::open(&path).unwrap();
            assert_eq!(backend.get("slot").unwrap(), None);
        }
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_file_backend_rejects_corrupt_file() {
        let path = temp_store_path();
        fs::write(&path, "not json at all").unwrap();
        let err = FileBackend::open(&path).unwrap_err();
        assert!(matches!(err, VaultError::Storage(_)));
        fs::remove_file(&path).ok();
    }
}
