//! Expiry Purge Task
//!
//! Background task that periodically sweeps expired and stale-version entries
//! out of both cache tiers. Reads already ignore such entries, so this only
//! reclaims space.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCache;

/// Spawns a background task that purges invalid cache entries every
/// `interval_secs` seconds.
///
/// The write lock is taken once per sweep. Abort the returned handle during
/// graceful shutdown.
///
/// # Example
/// ```ignore
/// let purge_handle = spawn_purge_task(state.cache.clone(), 60);
/// // Later, during shutdown:
/// purge_handle.abort();
/// ```
pub fn spawn_purge_task(cache: SharedCache, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting cache purge task with interval of {} seconds",
            interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.write().await.purge_expired();

            if removed > 0 {
                info!("Cache purge: removed {} invalid entries", removed);
            } else {
                debug!("Cache purge: nothing to remove");
            }
        }
    })
}
