//! Cached Accessors Module
//!
//! Named reads bound to one backend call, one cache key and one TTL class,
//! plus the invalidation and warm-up entry points used by write paths.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::backend::{Backend, BackendResult, CountedResource};
use super::keys::{
    ADMIN_STATS, CLIENT_ASSIGNMENTS, PARAM_LIMIT, PARAM_TRAINER_ID, PARAM_USER_ID, PT_CLIENTS,
    PT_PROGRAMS, PT_TEMPLATES, PUBLISHED_ARTICLES, TRAINER_PREFIX, USER_ENTITLEMENTS,
    USER_PROFILE, WORKOUT_PROGRAMS,
};
use super::memoize::memoize;
use super::ttl::TtlClass;
use crate::cache::{CacheParams, SharedCache};
use crate::error::BackendError;
use crate::models::{
    AdminStats, Article, Entitlement, ProgramAssignment, ProgramTemplate, TrainerClient,
    UserProfile, WorkoutProgram,
};

fn by_user(user_id: &str) -> CacheParams {
    CacheParams::new().with(PARAM_USER_ID, user_id)
}

fn by_trainer(trainer_id: &str) -> CacheParams {
    CacheParams::new().with(PARAM_TRAINER_ID, trainer_id)
}

/// Logs a failed warm-up read and reports whether it succeeded.
fn warmed<T>(name: &str, result: BackendResult<T>) -> usize {
    match result {
        Ok(_) => 1,
        Err(e) => {
            warn!("Cache warm-up of {} failed: {}", name, e);
            0
        }
    }
}

// == Cached Accessors ==
/// Cached reads over one shared cache and one backend.
#[derive(Clone)]
pub struct CachedAccessors {
    cache: SharedCache,
    backend: Arc<dyn Backend>,
}

impl CachedAccessors {
    pub fn new(cache: SharedCache, backend: Arc<dyn Backend>) -> Self {
        Self { cache, backend }
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    // == Accessors ==

    pub async fn user_profile(&self, user_id: &str) -> BackendResult<UserProfile> {
        memoize(&self.cache, USER_PROFILE, Some(&by_user(user_id)), TtlClass::Long, || {
            self.backend.fetch_profile(user_id)
        })
        .await
    }

    pub async fn user_entitlements(&self, user_id: &str) -> BackendResult<Vec<Entitlement>> {
        memoize(&self.cache, USER_ENTITLEMENTS, Some(&by_user(user_id)), TtlClass::Medium, || {
            self.backend.fetch_entitlements(user_id)
        })
        .await
    }

    pub async fn client_assignments(&self, user_id: &str) -> BackendResult<Vec<ProgramAssignment>> {
        memoize(&self.cache, CLIENT_ASSIGNMENTS, Some(&by_user(user_id)), TtlClass::Medium, || {
            self.backend.fetch_assignments(user_id)
        })
        .await
    }

    pub async fn trainer_programs(&self, trainer_id: &str) -> BackendResult<Vec<WorkoutProgram>> {
        memoize(&self.cache, PT_PROGRAMS, Some(&by_trainer(trainer_id)), TtlClass::Medium, || {
            self.backend.fetch_trainer_programs(trainer_id)
        })
        .await
    }

    pub async fn trainer_templates(&self, trainer_id: &str) -> BackendResult<Vec<ProgramTemplate>> {
        memoize(&self.cache, PT_TEMPLATES, Some(&by_trainer(trainer_id)), TtlClass::Medium, || {
            self.backend.fetch_trainer_templates(trainer_id)
        })
        .await
    }

    pub async fn trainer_clients(&self, trainer_id: &str) -> BackendResult<Vec<TrainerClient>> {
        memoize(&self.cache, PT_CLIENTS, Some(&by_trainer(trainer_id)), TtlClass::Medium, || {
            self.backend.fetch_trainer_clients(trainer_id)
        })
        .await
    }

    pub async fn workout_programs(&self) -> BackendResult<Vec<WorkoutProgram>> {
        memoize(&self.cache, WORKOUT_PROGRAMS, None, TtlClass::Long, || {
            self.backend.fetch_workout_programs()
        })
        .await
    }

    pub async fn published_articles(&self, limit: usize) -> BackendResult<Vec<Article>> {
        let params = CacheParams::new().with(PARAM_LIMIT, limit);
        memoize(&self.cache, PUBLISHED_ARTICLES, Some(&params), TtlClass::Long, || {
            self.backend.fetch_published_articles(limit)
        })
        .await
    }

    /// Dashboard aggregate of four row counts, fetched concurrently.
    pub async fn admin_stats(&self) -> BackendResult<AdminStats> {
        let backend = self.backend.as_ref();
        memoize(&self.cache, ADMIN_STATS, None, TtlClass::Short, move || async move {
            let (total_users, active_subscriptions, total_programs, published_articles) = tokio::try_join!(
                backend.count(CountedResource::Users),
                backend.count(CountedResource::ActiveSubscriptions),
                backend.count(CountedResource::Programs),
                backend.count(CountedResource::PublishedArticles),
            )?;

            Ok::<_, BackendError>(AdminStats {
                total_users,
                active_subscriptions,
                total_programs,
                published_articles,
                generated_at: Utc::now(),
            })
        })
        .await
    }

    // == Invalidation ==

    pub async fn invalidate_user_profile(&self, user_id: &str) {
        self.cache
            .write()
            .await
            .remove(USER_PROFILE, Some(&by_user(user_id)));
    }

    pub async fn invalidate_user_entitlements(&self, user_id: &str) {
        self.cache
            .write()
            .await
            .remove(USER_ENTITLEMENTS, Some(&by_user(user_id)));
    }

    pub async fn invalidate_client_assignments(&self, user_id: &str) {
        self.cache
            .write()
            .await
            .remove(CLIENT_ASSIGNMENTS, Some(&by_user(user_id)));
    }

    /// Drops every trainer-scoped entry, for all trainers.
    pub async fn invalidate_trainer_data(&self) {
        self.cache.write().await.clear_pattern(TRAINER_PREFIX);
    }

    /// Drops the trainer-scoped entries of one trainer.
    pub async fn invalidate_trainer(&self, trainer_id: &str) {
        let params = by_trainer(trainer_id);
        let mut cache = self.cache.write().await;
        for base_key in [PT_PROGRAMS, PT_TEMPLATES, PT_CLIENTS] {
            cache.remove(base_key, Some(&params));
        }
    }

    pub async fn invalidate_workout_programs(&self) {
        self.cache.write().await.remove(WORKOUT_PROGRAMS, None);
    }

    /// Drops article lists of every page size.
    pub async fn invalidate_articles(&self) {
        self.cache.write().await.clear_pattern(PUBLISHED_ARTICLES);
    }

    pub async fn invalidate_admin_stats(&self) {
        self.cache.write().await.remove(ADMIN_STATS, None);
    }

    /// Full reset: empties both tiers and bumps the cache version.
    pub async fn invalidate_all(&self) {
        self.cache.write().await.clear();
    }

    // == Warm-up ==
    // Best effort: failures are logged and counted, never returned.

    /// Loads what a signed-in client needs first. Returns how many reads succeeded.
    pub async fn warm_user(&self, user_id: &str) -> usize {
        let (profile, entitlements, assignments, programs) = tokio::join!(
            self.user_profile(user_id),
            self.user_entitlements(user_id),
            self.client_assignments(user_id),
            self.workout_programs(),
        );

        let loaded = warmed(USER_PROFILE, profile)
            + warmed(USER_ENTITLEMENTS, entitlements)
            + warmed(CLIENT_ASSIGNMENTS, assignments)
            + warmed(WORKOUT_PROGRAMS, programs);
        info!("Warmed {}/4 entries for user {}", loaded, user_id);
        loaded
    }

    /// Loads the trainer dashboard. Returns how many reads succeeded.
    pub async fn warm_trainer(&self, trainer_id: &str) -> usize {
        let (programs, templates, clients) = tokio::join!(
            self.trainer_programs(trainer_id),
            self.trainer_templates(trainer_id),
            self.trainer_clients(trainer_id),
        );

        let loaded = warmed(PT_PROGRAMS, programs)
            + warmed(PT_TEMPLATES, templates)
            + warmed(PT_CLIENTS, clients);
        info!("Warmed {}/3 entries for trainer {}", loaded, trainer_id);
        loaded
    }

    /// Loads the admin dashboard. Returns how many reads succeeded.
    pub async fn warm_admin(&self) -> usize {
        let (stats, articles) = tokio::join!(
            self.admin_stats(),
            self.published_articles(super::DEFAULT_ARTICLE_LIMIT),
        );

        let loaded = warmed(ADMIN_STATS, stats) + warmed(PUBLISHED_ARTICLES, articles);
        info!("Warmed {}/2 admin entries", loaded);
        loaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    use crate::accessors::stub::StubBackend;
    use crate::cache::{shared, CacheStore, ManualClock, MemoryStorage};
    use crate::config::CacheConfig;

    struct Harness {
        accessors: CachedAccessors,
        backend: Arc<StubBackend>,
        clock: ManualClock,
    }

    fn harness() -> Harness {
        let clock = ManualClock::new(0);
        let store = CacheStore::with_clock(
            CacheConfig::default(),
            Arc::new(MemoryStorage::new()),
            Arc::new(clock.clone()),
        );
        let backend = Arc::new(StubBackend::new());
        Harness {
            accessors: CachedAccessors::new(shared(store), backend.clone()),
            backend,
            clock,
        }
    }

    #[tokio::test]
    async fn test_accessor_fetches_once() {
        let h = harness();

        let first = assert_ok!(h.accessors.user_profile("u-1").await);
        let second = assert_ok!(h.accessors.user_profile("u-1").await);

        assert_eq!(first, second);
        assert_eq!(first.id, "u-1");
        assert_eq!(h.backend.calls("fetch_profile"), 1);
    }

    #[tokio::test]
    async fn test_accessor_keys_by_param() {
        let h = harness();

        assert_ok!(h.accessors.user_profile("u-1").await);
        assert_ok!(h.accessors.user_profile("u-2").await);

        assert_eq!(h.backend.calls("fetch_profile"), 2);
    }

    #[tokio::test]
    async fn test_accessor_error_propagates_and_caches_nothing() {
        let h = harness();
        h.backend.set_failing(true);

        let err = assert_err!(h.accessors.trainer_programs("t-1").await);
        assert_eq!(
            err,
            BackendError::Request("stub backend unavailable".to_string())
        );
        assert_eq!(h.accessors.cache().read().await.stats().memory_size, 0);

        h.backend.set_failing(false);
        assert_ok!(h.accessors.trainer_programs("t-1").await);
        assert_ok!(h.accessors.trainer_programs("t-1").await);
        assert_eq!(h.backend.calls("fetch_trainer_programs"), 2);
    }

    #[tokio::test]
    async fn test_not_found_propagates() {
        let h = harness();

        let err = assert_err!(h.accessors.user_profile("missing").await);
        assert!(matches!(err, BackendError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_admin_stats_aggregates_counts() {
        let h = harness();

        let stats = assert_ok!(h.accessors.admin_stats().await);
        assert_eq!(stats.total_users, 120);
        assert_eq!(stats.active_subscriptions, 45);
        assert_eq!(stats.total_programs, 12);
        assert_eq!(stats.published_articles, 30);
        assert_eq!(h.backend.calls("count"), 4);

        assert_ok!(h.accessors.admin_stats().await);
        assert_eq!(h.backend.calls("count"), 4);
    }

    #[tokio::test]
    async fn test_admin_stats_expires_on_short_ttl() {
        let h = harness();

        assert_ok!(h.accessors.admin_stats().await);
        h.clock.advance(TtlClass::Short.as_millis());
        assert_ok!(h.accessors.admin_stats().await);

        assert_eq!(h.backend.calls("count"), 8);
    }

    #[tokio::test]
    async fn test_long_ttl_outlives_short() {
        let h = harness();

        assert_ok!(h.accessors.user_profile("u-1").await);
        h.clock.advance(TtlClass::Medium.as_millis());
        assert_ok!(h.accessors.user_profile("u-1").await);

        assert_eq!(h.backend.calls("fetch_profile"), 1);
    }

    #[tokio::test]
    async fn test_invalidate_user_profile() {
        let h = harness();

        assert_ok!(h.accessors.user_profile("u-1").await);
        assert_ok!(h.accessors.user_profile("u-2").await);
        h.accessors.invalidate_user_profile("u-1").await;
        assert_ok!(h.accessors.user_profile("u-1").await);
        assert_ok!(h.accessors.user_profile("u-2").await);

        assert_eq!(h.backend.calls("fetch_profile"), 3);
    }

    #[tokio::test]
    async fn test_invalidate_trainer_data_clears_family() {
        let h = harness();

        assert_ok!(h.accessors.trainer_programs("t-1").await);
        assert_ok!(h.accessors.trainer_templates("t-2").await);
        assert_ok!(h.accessors.user_profile("u-1").await);

        h.accessors.invalidate_trainer_data().await;

        assert_ok!(h.accessors.trainer_programs("t-1").await);
        assert_ok!(h.accessors.trainer_templates("t-2").await);
        assert_ok!(h.accessors.user_profile("u-1").await);

        assert_eq!(h.backend.calls("fetch_trainer_programs"), 2);
        assert_eq!(h.backend.calls("fetch_trainer_templates"), 2);
        assert_eq!(h.backend.calls("fetch_profile"), 1);
    }

    #[tokio::test]
    async fn test_invalidate_single_trainer() {
        let h = harness();

        assert_ok!(h.accessors.trainer_clients("t-1").await);
        assert_ok!(h.accessors.trainer_clients("t-2").await);
        h.accessors.invalidate_trainer("t-1").await;
        assert_ok!(h.accessors.trainer_clients("t-1").await);
        assert_ok!(h.accessors.trainer_clients("t-2").await);

        assert_eq!(h.backend.calls("fetch_trainer_clients"), 3);
    }

    #[tokio::test]
    async fn test_invalidate_articles_covers_all_limits() {
        let h = harness();

        assert_ok!(h.accessors.published_articles(5).await);
        assert_ok!(h.accessors.published_articles(10).await);
        h.accessors.invalidate_articles().await;
        assert_ok!(h.accessors.published_articles(5).await);
        assert_ok!(h.accessors.published_articles(10).await);

        assert_eq!(h.backend.calls("fetch_published_articles"), 4);
    }

    #[tokio::test]
    async fn test_invalidate_all_bumps_version() {
        let h = harness();

        assert_ok!(h.accessors.workout_programs().await);
        h.accessors.invalidate_all().await;
        assert_ok!(h.accessors.workout_programs().await);

        assert_eq!(h.backend.calls("fetch_workout_programs"), 2);
        assert_eq!(h.accessors.cache().read().await.version(), 2);
    }

    #[tokio::test]
    async fn test_warm_user_populates_cache() {
        let h = harness();

        assert_eq!(h.accessors.warm_user("u-1").await, 4);
        let calls_after_warm = h.backend.total_calls();

        assert_ok!(h.accessors.user_profile("u-1").await);
        assert_ok!(h.accessors.user_entitlements("u-1").await);
        assert_ok!(h.accessors.client_assignments("u-1").await);
        assert_ok!(h.accessors.workout_programs().await);
        assert_eq!(h.backend.total_calls(), calls_after_warm);
    }

    #[tokio::test]
    async fn test_warm_swallows_failures() {
        let h = harness();
        h.backend.set_failing(true);

        assert_eq!(h.accessors.warm_trainer("t-1").await, 0);
        assert_eq!(h.accessors.warm_admin().await, 0);
        assert_eq!(h.accessors.cache().read().await.stats().memory_size, 0);
    }

    #[tokio::test]
    async fn test_warm_partial_success() {
        let h = harness();

        assert_ok!(h.accessors.trainer_programs("t-1").await);
        h.backend.set_failing(true);

        // The cached read still succeeds
        assert_eq!(h.accessors.warm_trainer("t-1").await, 1);
    }
}
