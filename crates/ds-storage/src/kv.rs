// kv.rs — KeyValueStore trait plus in-memory and file-backed implementations.
//
// The KeyValueStore trait is the only way the goal store and the reminder
// scheduler touch durable state. It is deliberately tiny (get/set/remove by
// key) so tests can swap in MemoryStore while the CLI uses FileStore.
//
// Design: FileStore keeps one file per key inside a data directory. Writes
// land in a sibling temp file first and are renamed into place, so a value
// is either the old content or the new content, never a torn write.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::StorageError;

/// Default per-value ceiling for FileStore (5 MiB), matching the practical
/// limit of browser-style key-value storage that photo payloads must fit in.
pub const DEFAULT_MAX_VALUE_BYTES: usize = 5 * 1024 * 1024;

/// Trait for durable get/set-by-key storage.
///
/// Methods take `&self` so a single backend can be shared (via `Arc`)
/// between the goal store and the reminder scheduler. Implementations use
/// interior mutability where they need it.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if it was never written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Returns whether anything was removed.
    fn remove(&self, key: &str) -> Result<bool, StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        (**self).remove(key)
    }
}

/// In-memory KeyValueStore for tests and ephemeral sessions.
///
/// An optional quota caps the total size (keys + values) of everything
/// stored, which lets tests exercise the `QuotaExceeded` path.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that rejects writes once the total stored size would
    /// exceed `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(limit) = self.quota_bytes {
            // Size of everything except the entry being replaced, plus the new entry.
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let size = others + key.len() + value.len();
            if size > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    size,
                    limit,
                });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.remove(key).is_some())
    }
}

/// File-backed KeyValueStore: `<data_dir>/<key>` holds the value for `key`.
pub struct FileStore {
    data_dir: PathBuf,
    max_value_bytes: usize,
}

impl FileStore {
    /// Create a new store backed by the given directory.
    /// Creates the directory if it doesn't exist.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir).map_err(|source| StorageError::IoError {
            path: data_dir.clone(),
            source,
        })?;
        Ok(Self {
            data_dir,
            max_value_bytes: DEFAULT_MAX_VALUE_BYTES,
        })
    }

    /// Override the per-value size ceiling.
    pub fn with_max_value_bytes(mut self, max_value_bytes: usize) -> Self {
        self.max_value_bytes = max_value_bytes;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path to the file holding `key`.
    fn key_file(&self, key: &str) -> PathBuf {
        self.data_dir.join(key)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        let path = self.key_file(key);
        if !path.exists() {
            return Ok(None);
        }
        let value = fs::read_to_string(&path).map_err(|source| StorageError::IoError {
            path: path.clone(),
            source,
        })?;
        Ok(Some(value))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        if value.len() > self.max_value_bytes {
            return Err(StorageError::QuotaExceeded {
                key: key.to_string(),
                size: value.len(),
                limit: self.max_value_bytes,
            });
        }

        let path = self.key_file(key);
        let tmp = self.data_dir.join(format!(".{}.tmp", key));
        fs::write(&tmp, value).map_err(|source| StorageError::IoError {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StorageError::IoError {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(key, bytes = value.len(), "wrote storage key");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        validate_key(key)?;
        let path = self.key_file(key);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|source| StorageError::IoError { path, source })?;
        Ok(true)
    }
}

/// Keys become file names, so restrict them to a portable character set.
fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
