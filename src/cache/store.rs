//! Cache Store Module
//!
//! Two-tier expiring cache: an in-memory map in front of a persistent
//! key/value store, with TTL and global-version validity and size caps.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::{
    build_cache_key, CacheEntry, CacheParams, CacheStats, Clock, PersistentStorage, SystemClock,
};
use crate::config::CacheConfig;

type Payload = Arc<dyn Any + Send + Sync>;

/// Memory-tier slot. `seq` orders entries written within the same millisecond.
#[derive(Debug)]
struct MemorySlot {
    entry: CacheEntry<Payload>,
    seq: u64,
}

enum MemoryLookup<T> {
    Hit(T),
    Invalid,
    Absent,
}

// == Cache Store ==
/// Main cache storage with two tiers, TTL validity and version stamping.
#[derive(Debug)]
pub struct CacheStore {
    /// Fast tier, lost on restart
    memory: HashMap<String, MemorySlot>,
    /// Durable tier, string-serialized entries under prefixed keys
    storage: Arc<dyn PersistentStorage>,
    clock: Arc<dyn Clock>,
    config: CacheConfig,
    /// Global version; entries stamped with anything else are invalid
    version: u64,
    next_seq: u64,
    /// Write order of records persisted by this process, keyed by storage key
    storage_seq: HashMap<String, u64>,
    stats: CacheStats,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a store over `storage` using the system clock.
    ///
    /// The global version is read from storage once, defaulting to 1.
    pub fn new(config: CacheConfig, storage: Arc<dyn PersistentStorage>) -> Self {
        Self::with_clock(config, storage, Arc::new(SystemClock))
    }

    /// Creates a store with an explicit time source.
    pub fn with_clock(
        config: CacheConfig,
        storage: Arc<dyn PersistentStorage>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let version = load_version(storage.as_ref(), &config.version_key);
        debug!("Cache store opened at version {}", version);

        Self {
            memory: HashMap::new(),
            storage,
            clock,
            config,
            version,
            next_seq: 0,
            storage_seq: HashMap::new(),
            stats: CacheStats::new(),
        }
    }

    // == Get ==
    /// Retrieves a value by base key and parameters.
    ///
    /// Looks in memory first, then in persistent storage. A valid persistent
    /// entry is promoted into memory. Invalid or unreadable persistent records
    /// are deleted. Every failure mode is a plain miss.
    pub fn get<T>(&mut self, base_key: &str, params: Option<&CacheParams>) -> Option<T>
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
    {
        let key = build_cache_key(base_key, params);
        let now = self.clock.now_ms();

        match self.memory_lookup::<T>(&key, now) {
            MemoryLookup::Hit(data) => {
                self.stats.record_hit();
                debug!("Memory hit for {}", key);
                return Some(data);
            }
            MemoryLookup::Invalid => {
                self.memory.remove(&key);
            }
            MemoryLookup::Absent => {}
        }

        if let Some(data) = self.storage_lookup::<T>(&key, now) {
            self.stats.record_hit();
            debug!("Storage hit for {}, promoted to memory", key);
            return Some(data);
        }

        self.stats.record_miss();
        debug!("Cache miss for {}", key);
        None
    }

    fn memory_lookup<T>(&self, key: &str, now: u64) -> MemoryLookup<T>
    where
        T: Clone + 'static,
    {
        let Some(slot) = self.memory.get(key) else {
            return MemoryLookup::Absent;
        };

        if !slot.entry.is_valid(now, self.version) {
            return MemoryLookup::Invalid;
        }

        match slot.entry.data.downcast_ref::<T>() {
            Some(data) => MemoryLookup::Hit(data.clone()),
            None => {
                warn!("Cached value for {} has a different type than requested", key);
                MemoryLookup::Invalid
            }
        }
    }

    fn storage_lookup<T>(&mut self, key: &str, now: u64) -> Option<T>
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
    {
        let storage_key = self.storage_key(key);

        let raw = match self.storage.get_item(&storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read {} from storage: {}", storage_key, e);
                return None;
            }
        };

        let entry = match serde_json::from_str::<CacheEntry<serde_json::Value>>(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Dropping malformed record {}: {}", storage_key, e);
                self.remove_storage_item(&storage_key);
                return None;
            }
        };

        if !entry.is_valid(now, self.version) {
            debug!("Dropping expired or stale record {}", storage_key);
            self.remove_storage_item(&storage_key);
            return None;
        }

        let data: T = match serde_json::from_value(entry.data) {
            Ok(data) => data,
            Err(e) => {
                warn!("Record {} does not match requested type: {}", storage_key, e);
                self.remove_storage_item(&storage_key);
                return None;
            }
        };

        // Promotion writes to memory only; the persistent record is already current
        let seq = self.bump_seq();
        let promoted = CacheEntry {
            data: Arc::new(data.clone()) as Payload,
            timestamp: entry.timestamp,
            ttl: entry.ttl,
            key: entry.key,
            version: entry.version,
        };
        self.memory.insert(
            key.to_string(),
            MemorySlot {
                entry: promoted,
                seq,
            },
        );

        Some(data)
    }

    // == Set ==
    /// Stores `data` under base key and parameters for `ttl` milliseconds.
    ///
    /// The memory tier is always written. A persistence failure is logged and
    /// swallowed. Size caps are enforced afterwards.
    pub fn set<T>(&mut self, base_key: &str, data: T, ttl: u64, params: Option<&CacheParams>)
    where
        T: Serialize + Send + Sync + 'static,
    {
        let key = build_cache_key(base_key, params);
        let entry = CacheEntry::new(key.clone(), data, ttl, self.clock.now_ms(), self.version);

        let seq = self.bump_seq();
        let storage_key = self.storage_key(&key);
        let persisted = match serde_json::to_string(&entry) {
            Ok(raw) => match self.storage.set_item(&storage_key, &raw) {
                Ok(()) => true,
                Err(e) => {
                    warn!("Failed to persist {}: {}", storage_key, e);
                    false
                }
            },
            Err(e) => {
                warn!("Failed to serialize {}: {}", key, e);
                false
            }
        };

        if persisted {
            self.storage_seq.insert(storage_key, seq);
        } else {
            // The previous record would outlive the value that replaced it
            self.remove_storage_item(&storage_key);
        }

        self.memory.insert(
            key,
            MemorySlot {
                entry: entry.map(|d| Arc::new(d) as Payload),
                seq,
            },
        );

        self.cleanup();
    }

    // == Remove ==
    /// Removes an entry from both tiers. Absent keys are fine.
    pub fn remove(&mut self, base_key: &str, params: Option<&CacheParams>) {
        let key = build_cache_key(base_key, params);
        self.memory.remove(&key);
        let storage_key = self.storage_key(&key);
        self.remove_storage_item(&storage_key);
    }

    // == Clear ==
    /// Empties both tiers and bumps the global version.
    ///
    /// The bump invalidates anything that survives the sweep, such as records
    /// in storage another process is still writing.
    pub fn clear(&mut self) {
        self.memory.clear();

        let keys = self.cache_storage_keys();
        self.remove_storage_items(keys);
        self.storage_seq.clear();

        self.version += 1;
        if let Err(e) = self
            .storage
            .set_item(&self.config.version_key, &self.version.to_string())
        {
            warn!("Failed to persist cache version {}: {}", self.version, e);
        }
        debug!("Cache cleared, version is now {}", self.version);
    }

    // == Clear Pattern ==
    /// Removes every entry whose full key contains `pattern`, from both tiers.
    ///
    /// Returns the number of records removed across tiers.
    pub fn clear_pattern(&mut self, pattern: &str) -> usize {
        let before = self.memory.len();
        self.memory.retain(|key, _| !key.contains(pattern));
        let prefix_len = self.config.prefix.len();
        let matching: Vec<String> = self
            .cache_storage_keys()
            .into_iter()
            .filter(|storage_key| storage_key[prefix_len..].contains(pattern))
            .collect();
        let removed = before - self.memory.len() + matching.len();
        self.remove_storage_items(matching);

        debug!("Cleared {} records matching '{}'", removed, pattern);
        removed
    }

    // == Clear Memory Tier ==
    /// Drops the memory tier only, as a process restart would.
    pub fn clear_memory_tier(&mut self) {
        self.memory.clear();
    }

    // == Stats ==
    /// Returns current cache diagnostics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.memory_size = self.memory.len();
        stats.storage_size = self.cache_storage_keys().len();
        stats.version = self.version;
        stats
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    // == Cleanup ==
    /// Enforces the size caps, evicting oldest-by-write-time first.
    ///
    /// Reads do not refresh an entry's position.
    fn cleanup(&mut self) {
        let evicted = self.evict_memory_overflow() + self.evict_storage_overflow();
        if evicted > 0 {
            self.stats.record_evictions(evicted);
            debug!("Evicted {} entries over capacity", evicted);
        }
    }

    fn evict_memory_overflow(&mut self) -> usize {
        let cap = self.config.memory_cap;
        if self.memory.len() <= cap {
            return 0;
        }

        let mut order: Vec<(u64, u64, String)> = self
            .memory
            .iter()
            .map(|(key, slot)| (slot.entry.timestamp, slot.seq, key.clone()))
            .collect();
        order.sort();

        let excess = self.memory.len() - cap;
        for (_, _, key) in order.into_iter().take(excess) {
            self.memory.remove(&key);
        }
        excess
    }

    /// Same-millisecond records go in write order. Records left by an earlier
    /// process carry no write order and sort ahead of this process's writes.
    fn evict_storage_overflow(&mut self) -> usize {
        let cap = self.config.storage_cap;
        let keys = self.cache_storage_keys();
        if keys.len() <= cap {
            return 0;
        }

        let mut order: Vec<(u64, u64, String)> = keys
            .into_iter()
            .map(|storage_key| {
                let timestamp = self
                    .read_record_meta(&storage_key)
                    .map(|entry| entry.timestamp)
                    .unwrap_or(0);
                let seq = self.storage_seq.get(&storage_key).copied().unwrap_or(0);
                (timestamp, seq, storage_key)
            })
            .collect();
        order.sort();

        let excess = order.len() - cap;
        let victims = order
            .into_iter()
            .take(excess)
            .map(|(_, _, storage_key)| storage_key)
            .collect();
        self.remove_storage_items(victims);
        excess
    }

    // == Purge Expired ==
    /// Sweeps both tiers for expired, stale-version or malformed entries.
    ///
    /// Returns the number of records removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let version = self.version;

        let before = self.memory.len();
        self.memory
            .retain(|_, slot| slot.entry.is_valid(now, version));
        let invalid: Vec<String> = self
            .cache_storage_keys()
            .into_iter()
            .filter(|storage_key| {
                !self
                    .read_record_meta(storage_key)
                    .map(|entry| entry.is_valid(now, version))
                    .unwrap_or(false)
            })
            .collect();
        let removed = before - self.memory.len() + invalid.len();
        self.remove_storage_items(invalid);

        removed
    }

    // == Helpers ==
    fn storage_key(&self, key: &str) -> String {
        format!("{}{}", self.config.prefix, key)
    }

    fn bump_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Lists persistent keys that belong to this cache.
    fn cache_storage_keys(&self) -> Vec<String> {
        match self.storage.keys() {
            Ok(keys) => keys
                .into_iter()
                .filter(|k| k.starts_with(&self.config.prefix) && *k != self.config.version_key)
                .collect(),
            Err(e) => {
                warn!("Failed to list storage keys: {}", e);
                Vec::new()
            }
        }
    }

    /// Parses a record's metadata without materializing its payload.
    fn read_record_meta(&self, storage_key: &str) -> Option<CacheEntry<IgnoredAny>> {
        let raw = self.storage.get_item(storage_key).ok().flatten()?;
        serde_json::from_str(&raw).ok()
    }

    fn remove_storage_item(&mut self, storage_key: &str) {
        self.storage_seq.remove(storage_key);
        if let Err(e) = self.storage.remove_item(storage_key) {
            warn!("Failed to remove {} from storage: {}", storage_key, e);
        }
    }

    fn remove_storage_items(&mut self, storage_keys: Vec<String>) {
        if storage_keys.is_empty() {
            return;
        }
        for storage_key in &storage_keys {
            self.storage_seq.remove(storage_key);
        }
        if let Err(e) = self.storage.remove_items(&storage_keys) {
            warn!("Failed to remove {} records from storage: {}", storage_keys.len(), e);
        }
    }
}

fn load_version(storage: &dyn PersistentStorage, version_key: &str) -> u64 {
    match storage.get_item(version_key) {
        Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring unparseable cache version '{}'", raw);
            1
        }),
        Ok(None) => 1,
        Err(e) => {
            warn!("Failed to read cache version: {}", e);
            1
        }
    }
}
