//! Configuration Module
//!
//! Handles loading and managing gateway and cache configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::cache::{DEFAULT_MEMORY_CAP, DEFAULT_PREFIX, DEFAULT_STORAGE_CAP, DEFAULT_VERSION_KEY};

// == Cache Config ==
/// Parameters consumed by the cache store.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Maximum entries kept in the memory tier
    pub memory_cap: usize,
    /// Maximum cache records kept in the persistent tier
    pub storage_cap: usize,
    /// Literal prefix for persistent cache records
    pub prefix: String,
    /// Persistent key holding the global version
    pub version_key: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            memory_cap: DEFAULT_MEMORY_CAP,
            storage_cap: DEFAULT_STORAGE_CAP,
            prefix: DEFAULT_PREFIX.to_string(),
            version_key: DEFAULT_VERSION_KEY.to_string(),
        }
    }
}

// == Config ==
/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache store parameters
    pub cache: CacheConfig,
    /// JSON file for the persistent tier, None keeps it in process memory
    pub storage_path: Option<String>,
    /// HTTP server port
    pub server_port: u16,
    /// Background purge interval in seconds, 0 disables the task
    pub purge_interval: u64,
    /// Base URL of the hosted database
    pub backend_url: String,
    /// API key sent with every backend request
    pub backend_api_key: String,
    /// Backend request timeout in seconds
    pub backend_timeout: u64,
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MEMORY_CAP` - Memory tier entry cap (default: 100)
    /// - `STORAGE_CAP` - Persistent tier record cap (default: 50)
    /// - `CACHE_PREFIX` - Persistent record prefix (default: `fitcache:`)
    /// - `STORAGE_PATH` - Persistent tier file (default: unset, in-memory)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `PURGE_INTERVAL` - Purge frequency in seconds (default: 60)
    /// - `BACKEND_URL` - Hosted database URL (default: `http://localhost:54321`)
    /// - `BACKEND_API_KEY` - Hosted database key (default: empty)
    /// - `BACKEND_TIMEOUT` - Request timeout in seconds (default: 10)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            cache: CacheConfig {
                memory_cap: env_or("MEMORY_CAP", defaults.cache.memory_cap),
                storage_cap: env_or("STORAGE_CAP", defaults.cache.storage_cap),
                prefix: env_or("CACHE_PREFIX", defaults.cache.prefix),
                version_key: defaults.cache.version_key,
            },
            storage_path: env::var("STORAGE_PATH").ok().filter(|p| !p.is_empty()),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            purge_interval: env_or("PURGE_INTERVAL", defaults.purge_interval),
            backend_url: env_or("BACKEND_URL", defaults.backend_url),
            backend_api_key: env_or("BACKEND_API_KEY", defaults.backend_api_key),
            backend_timeout: env_or("BACKEND_TIMEOUT", defaults.backend_timeout),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            storage_path: None,
            server_port: 3000,
            purge_interval: 60,
            backend_url: "http://localhost:54321".to_string(),
            backend_api_key: String::new(),
            backend_timeout: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.cache.memory_cap, 100);
        assert_eq!(config.cache.storage_cap, 50);
        assert_eq!(config.cache.prefix, "fitcache:");
        assert_eq!(config.cache.version_key, "fitcache_version");
        assert!(config.storage_path.is_none());
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.purge_interval, 60);
        assert_eq!(config.backend_timeout, 10);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        for name in [
            "MEMORY_CAP",
            "STORAGE_CAP",
            "CACHE_PREFIX",
            "STORAGE_PATH",
            "SERVER_PORT",
            "PURGE_INTERVAL",
            "BACKEND_URL",
            "BACKEND_API_KEY",
            "BACKEND_TIMEOUT",
        ] {
            env::remove_var(name);
        }

        let config = Config::from_env();
        assert_eq!(config.cache, CacheConfig::default());
        assert!(config.storage_path.is_none());
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.backend_url, "http://localhost:54321");
        assert!(config.backend_api_key.is_empty());
    }

    #[test]
    fn test_env_or_ignores_unparseable() {
        env::set_var("FITCACHE_TEST_UNPARSEABLE", "not-a-number");
        assert_eq!(env_or("FITCACHE_TEST_UNPARSEABLE", 7usize), 7);
        env::remove_var("FITCACHE_TEST_UNPARSEABLE");
    }
}
