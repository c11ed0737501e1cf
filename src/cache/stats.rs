//! Cache Statistics Module
//!
//! Diagnostic counters and tier sizes for the cache store.

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of cache diagnostics. Accurate at the time it was taken, nothing more.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Entries currently held in the memory tier
    pub memory_size: usize,
    /// Cache records currently held in the persistent tier
    pub storage_size: usize,
    /// Current global cache version
    pub version: u64,
    /// Lookups answered from either tier
    pub hits: u64,
    /// Lookups that found nothing valid
    pub misses: u64,
    /// Entries dropped by the size caps
    pub evictions: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }
}
