//! TTL classes for cached reads, in milliseconds.

use serde::{Deserialize, Serialize};

/// 5 minutes: fast-moving aggregates
pub const CACHE_TTL_SHORT: u64 = 5 * 60 * 1000;

/// 15 minutes: lists
pub const CACHE_TTL_MEDIUM: u64 = 15 * 60 * 1000;

/// 1 hour: profiles and near-static reference data
pub const CACHE_TTL_LONG: u64 = 60 * 60 * 1000;

/// 24 hours
pub const CACHE_TTL_VERY_LONG: u64 = 24 * 60 * 60 * 1000;

/// Volatility class of a cached read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TtlClass {
    Short,
    Medium,
    Long,
    VeryLong,
}

impl TtlClass {
    pub fn as_millis(self) -> u64 {
        match self {
            TtlClass::Short => CACHE_TTL_SHORT,
            TtlClass::Medium => CACHE_TTL_MEDIUM,
            TtlClass::Long => CACHE_TTL_LONG,
            TtlClass::VeryLong => CACHE_TTL_VERY_LONG,
        }
    }
}
