//! Fitcache - a two-tier read-through cache for a fitness platform's backend
//!
//! Fronts a hosted database with a bounded in-process tier and a bounded
//! persistent tier, both keyed by base name plus sorted parameters, with TTL
//! expiry and version-based bulk invalidation.

pub mod accessors;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use accessors::{Backend, CachedAccessors, RestBackend};
pub use api::{create_router, AppState};
pub use cache::{CacheStore, SharedCache};
pub use config::Config;
pub use tasks::spawn_purge_task;
