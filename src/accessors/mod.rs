//! Accessors Module
//!
//! Named cached reads over the hosted backend, with matching invalidation
//! and warm-up helpers.

mod backend;
mod cached;
pub mod keys;
mod memoize;
mod rest;
mod ttl;

#[cfg(test)]
pub(crate) mod stub;

pub use backend::{Backend, BackendResult, CountedResource};
pub use cached::CachedAccessors;
pub use memoize::memoize;
pub use rest::{parse_content_range_total, RestBackend};
pub use ttl::{TtlClass, CACHE_TTL_LONG, CACHE_TTL_MEDIUM, CACHE_TTL_SHORT, CACHE_TTL_VERY_LONG};

/// Page size for article lists when the caller gives none
pub const DEFAULT_ARTICLE_LIMIT: usize = 10;

/// Largest accepted article page size
pub const MAX_ARTICLE_LIMIT: usize = 100;
