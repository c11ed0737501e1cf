//! Get-or-fetch-and-set over the shared cache.

use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::backend::BackendResult;
use super::ttl::TtlClass;
use crate::cache::{CacheParams, SharedCache};

/// Returns the cached value for `base_key`/`params`, or runs `fetch` and caches its result.
///
/// The cache lock is held only for the lookup and the final write, never while
/// `fetch` runs. A failed fetch caches nothing and its error is returned as-is.
/// Two concurrent misses on one key both fetch; the later write wins.
pub async fn memoize<T, F, Fut>(
    cache: &SharedCache,
    base_key: &str,
    params: Option<&CacheParams>,
    ttl: TtlClass,
    fetch: F,
) -> BackendResult<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = BackendResult<T>>,
{
    let cached = cache.write().await.get::<T>(base_key, params);
    if let Some(value) = cached {
        return Ok(value);
    }

    let value = fetch().await?;
    cache
        .write()
        .await
        .set(base_key, value.clone(), ttl.as_millis(), params);
    Ok(value)
}
