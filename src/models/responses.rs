//! Response DTOs for the gateway API
//!
//! Defines the structure of outgoing HTTP response bodies that are not domain records.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Entries in the memory tier
    pub memory_size: usize,
    /// Cache records in the persistent tier
    pub storage_size: usize,
    /// Current global cache version
    pub version: u64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            memory_size: stats.memory_size,
            storage_size: stats.storage_size,
            version: stats.version,
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for POST /invalidate and DELETE /cache
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// Success message
    pub message: String,
    /// Cache version after the operation
    pub version: u64,
}

impl InvalidateResponse {
    pub fn new(message: impl Into<String>, version: u64) -> Self {
        Self {
            message: message.into(),
            version,
        }
    }
}

/// Response body for the warm-up endpoints
#[derive(Debug, Clone, Serialize)]
pub struct WarmResponse {
    /// Reads that succeeded
    pub loaded: usize,
    /// Reads attempted
    pub requested: usize,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
