//! Cache Module
//!
//! Two-tier (memory + persistent) expiring cache with version-stamped bulk
//! invalidation and oldest-first size-bound eviction.

mod clock;
mod entry;
mod key;
mod stats;
mod storage;
mod store;


use std::sync::Arc;

use tokio::sync::RwLock;

// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{current_timestamp_ms, CacheEntry};
pub use key::{build_cache_key, CacheParams, ParamValue};
pub use stats::CacheStats;
pub use storage::{FileStorage, MemoryStorage, PersistentStorage, StorageResult};
pub use store::CacheStore;

/// The one cache instance of a process, shared between accessors and handlers.
pub type SharedCache = Arc<RwLock<CacheStore>>;

/// Wraps a store for sharing.
pub fn shared(store: CacheStore) -> SharedCache {
    Arc::new(RwLock::new(store))
}

// == Public Constants ==
/// Default number of entries held in memory
pub const DEFAULT_MEMORY_CAP: usize = 100;

/// Default number of cache records held in persistent storage
pub const DEFAULT_STORAGE_CAP: usize = 50;

/// Default literal prefix for persistent cache records
pub const DEFAULT_PREFIX: &str = "fitcache:";

/// Default persistent key for the global version counter
pub const DEFAULT_VERSION_KEY: &str = "fitcache_version";
