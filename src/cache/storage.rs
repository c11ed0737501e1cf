//! Persistent Storage Module
//!
//! String key/value backends for the persistent cache tier.

use std::collections::HashMap;
use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::error::StorageError;

/// Convenience Result type for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

// == Persistent Storage Trait ==
/// A flat, string-valued key/value store that outlives the in-memory tier.
///
/// Implementations use interior mutability so one instance can be shared
/// between the cache store and whoever else inspects it.
pub trait PersistentStorage: Send + Sync + Debug {
    /// Returns the stored value for `key`, if any.
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Removes `key`. Absent keys are not an error.
    fn remove_item(&self, key: &str) -> StorageResult<()>;

    /// Removes several keys as one mutation where the backend can batch.
    fn remove_items(&self, keys: &[String]) -> StorageResult<()> {
        keys.iter().try_for_each(|key| self.remove_item(key))
    }

    /// Lists every key currently stored.
    fn keys(&self) -> StorageResult<Vec<String>>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// == Memory Storage ==
/// Process-local storage with an optional byte quota.
///
/// Counts reads and writes so callers can observe which tier served a lookup.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
    /// Maximum total bytes of keys plus values, None = unlimited
    quota_bytes: Option<usize>,
    reads: AtomicU64,
    writes: AtomicU64,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates storage that rejects writes pushing usage past `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::default()
        }
    }

    /// Number of `get_item` calls served so far.
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Number of successful `set_item` calls so far.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        lock(&self.items).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.items).is_empty()
    }

    fn used_bytes(items: &HashMap<String, String>) -> usize {
        items.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl PersistentStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(lock(&self.items).get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut items = lock(&self.items);

        if let Some(quota) = self.quota_bytes {
            let replaced = items.get(key).map(|old| key.len() + old.len()).unwrap_or(0);
            let projected = Self::used_bytes(&items) - replaced + key.len() + value.len();
            if projected > quota {
                return Err(StorageError::QuotaExceeded(format!(
                    "{} bytes needed, quota is {}",
                    projected, quota
                )));
            }
        }

        items.insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        lock(&self.items).remove(key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(lock(&self.items).keys().cloned().collect())
    }
}

// == File Storage ==
/// Storage persisted as a single JSON object on disk.
///
/// The whole map is held in memory and rewritten on every mutation, via a
/// temporary file and rename so a crash never leaves a truncated document.
/// Writes block the calling thread while the cache lock is held, so this
/// suits the small storage caps the cache is configured with. Bulk removals
/// go through `remove_items` and flush once.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    /// Opens (or creates) the store at `path`.
    ///
    /// A missing file starts empty. An unreadable or malformed file is logged
    /// and replaced on the next write rather than failing the open.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let items = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<HashMap<String, String>>(&raw) {
                Ok(items) => {
                    debug!("Loaded {} records from {}", items.len(), path.display());
                    items
                }
                Err(e) => {
                    warn!("Discarding malformed storage file {}: {}", path.display(), e);
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            items: Mutex::new(items),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, items: &HashMap<String, String>) -> StorageResult<()> {
        let raw = serde_json::to_string(items)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl PersistentStorage for FileStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(lock(&self.items).get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut items = lock(&self.items);
        let previous = items.insert(key.to_string(), value.to_string());

        if let Err(e) = self.flush(&items) {
            // Keep memory and disk in agreement
            match previous {
                Some(old) => items.insert(key.to_string(), old),
                None => items.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        let mut items = lock(&self.items);
        if items.remove(key).is_some() {
            self.flush(&items)?;
        }
        Ok(())
    }

    fn remove_items(&self, keys: &[String]) -> StorageResult<()> {
        let mut items = lock(&self.items);
        let before = items.len();
        for key in keys {
            items.remove(key);
        }
        if items.len() != before {
            self.flush(&items)?;
        }
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(lock(&self.items).keys().cloned().collect())
    }
}
