//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL and version support.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// Represents a single cache entry with its payload and validity metadata.
///
/// The same shape is held in memory and, JSON-serialized, in persistent storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The cached payload
    pub data: T,
    /// Creation timestamp (Unix milliseconds)
    pub timestamp: u64,
    /// Validity duration in milliseconds
    pub ttl: u64,
    /// Fully-qualified cache key
    pub key: String,
    /// Global cache version at time of write
    pub version: u64,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new entry stamped with `now` and `version`.
    pub fn new(key: impl Into<String>, data: T, ttl: u64, now: u64, version: u64) -> Self {
        Self {
            data,
            timestamp: now,
            ttl,
            key: key.into(),
            version,
        }
    }

    // == Is Expired ==
    /// Checks whether the TTL has fully elapsed at `now`.
    ///
    /// Boundary condition: once `now - timestamp` reaches `ttl` the entry is
    /// expired. Timestamps in the future count as zero age.
    pub fn is_expired(&self, now: u64) -> bool {
        now.saturating_sub(self.timestamp) >= self.ttl
    }

    // == Is Valid ==
    /// An entry is valid only while unexpired AND stamped with the current version.
    pub fn is_valid(&self, now: u64, current_version: u64) -> bool {
        !self.is_expired(now) && self.version == current_version
    }

    /// Returns remaining TTL in milliseconds, saturating at zero.
    pub fn ttl_remaining_ms(&self, now: u64) -> u64 {
        (self.timestamp + self.ttl).saturating_sub(now)
    }

    /// Swaps the payload while keeping the metadata.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CacheEntry<U> {
        CacheEntry {
            data: f(self.data),
            timestamp: self.timestamp,
            ttl: self.ttl,
            key: self.key,
            version: self.version,
        }
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
