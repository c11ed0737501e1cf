//! API Handlers
//!
//! HTTP request handlers for each gateway endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::info;

use crate::accessors::{Backend, CachedAccessors, RestBackend};
use crate::cache::{shared, CacheStore, FileStorage, MemoryStorage, PersistentStorage, SharedCache};
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::{
    AdminStats, Article, ArticlesQuery, Entitlement, HealthResponse, InvalidateRequest,
    InvalidateResponse, InvalidationScope, ProgramAssignment, ProgramTemplate, StatsResponse,
    TrainerClient, UserProfile, WarmResponse, WorkoutProgram,
};

/// Application state shared across all handlers.
///
/// Holds the process-wide cache and the accessors bound to it.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache store
    pub cache: SharedCache,
    /// Cached reads over the backend
    pub accessors: CachedAccessors,
}

impl AppState {
    /// Creates a new AppState over an existing cache and backend.
    pub fn new(cache: SharedCache, backend: Arc<dyn Backend>) -> Self {
        Self {
            accessors: CachedAccessors::new(cache.clone(), backend),
            cache,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Opens the persistent tier (file-backed when `storage_path` is set) and
    /// builds the REST backend.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let storage: Arc<dyn PersistentStorage> = match &config.storage_path {
            Some(path) => {
                info!("Persistent cache tier at {}", path);
                Arc::new(FileStorage::open(path)?)
            }
            None => Arc::new(MemoryStorage::new()),
        };

        let cache = shared(CacheStore::new(config.cache.clone(), storage));
        let backend = RestBackend::from_config(config)?;
        Ok(Self::new(cache, Arc::new(backend)))
    }
}

// == Cached Reads ==

/// Handler for GET /profiles/:user_id
pub async fn profile_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserProfile>> {
    Ok(Json(state.accessors.user_profile(&user_id).await?))
}

/// Handler for GET /users/:user_id/entitlements
pub async fn entitlements_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Entitlement>>> {
    Ok(Json(state.accessors.user_entitlements(&user_id).await?))
}

/// Handler for GET /users/:user_id/assignments
pub async fn assignments_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<ProgramAssignment>>> {
    Ok(Json(state.accessors.client_assignments(&user_id).await?))
}

/// Handler for GET /trainers/:trainer_id/programs
pub async fn trainer_programs_handler(
    State(state): State<AppState>,
    Path(trainer_id): Path<String>,
) -> Result<Json<Vec<WorkoutProgram>>> {
    Ok(Json(state.accessors.trainer_programs(&trainer_id).await?))
}

/// Handler for GET /trainers/:trainer_id/templates
pub async fn trainer_templates_handler(
    State(state): State<AppState>,
    Path(trainer_id): Path<String>,
) -> Result<Json<Vec<ProgramTemplate>>> {
    Ok(Json(state.accessors.trainer_templates(&trainer_id).await?))
}

/// Handler for GET /trainers/:trainer_id/clients
pub async fn trainer_clients_handler(
    State(state): State<AppState>,
    Path(trainer_id): Path<String>,
) -> Result<Json<Vec<TrainerClient>>> {
    Ok(Json(state.accessors.trainer_clients(&trainer_id).await?))
}

/// Handler for GET /programs
pub async fn programs_handler(State(state): State<AppState>) -> Result<Json<Vec<WorkoutProgram>>> {
    Ok(Json(state.accessors.workout_programs().await?))
}

/// Handler for GET /articles?limit=N
pub async fn articles_handler(
    State(state): State<AppState>,
    Query(query): Query<ArticlesQuery>,
) -> Result<Json<Vec<Article>>> {
    let limit = query.effective_limit().map_err(ApiError::InvalidRequest)?;
    Ok(Json(state.accessors.published_articles(limit).await?))
}

/// Handler for GET /admin/stats
pub async fn admin_stats_handler(State(state): State<AppState>) -> Result<Json<AdminStats>> {
    Ok(Json(state.accessors.admin_stats().await?))
}

// == Invalidation ==

/// Handler for POST /invalidate
///
/// Maps a scope (plus id where needed) onto the matching invalidation helper.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let id = req.id.as_deref().unwrap_or_default();
    let accessors = &state.accessors;
    match req.scope {
        InvalidationScope::UserProfile => accessors.invalidate_user_profile(id).await,
        InvalidationScope::UserEntitlements => accessors.invalidate_user_entitlements(id).await,
        InvalidationScope::ClientAssignments => accessors.invalidate_client_assignments(id).await,
        InvalidationScope::Trainer => accessors.invalidate_trainer(id).await,
        InvalidationScope::TrainerData => accessors.invalidate_trainer_data().await,
        InvalidationScope::WorkoutPrograms => accessors.invalidate_workout_programs().await,
        InvalidationScope::Articles => accessors.invalidate_articles().await,
        InvalidationScope::AdminStats => accessors.invalidate_admin_stats().await,
        InvalidationScope::All => accessors.invalidate_all().await,
    }

    let version = state.cache.read().await.version();
    Ok(Json(InvalidateResponse::new(
        format!("Invalidated {:?}", req.scope),
        version,
    )))
}

/// Handler for DELETE /cache
///
/// Empties both tiers and bumps the cache version.
pub async fn clear_handler(State(state): State<AppState>) -> Json<InvalidateResponse> {
    state.accessors.invalidate_all().await;
    let version = state.cache.read().await.version();
    Json(InvalidateResponse::new("Cache cleared", version))
}

// == Warm-up ==

/// Handler for POST /warm/users/:user_id
pub async fn warm_user_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<WarmResponse> {
    let loaded = state.accessors.warm_user(&user_id).await;
    Json(WarmResponse {
        loaded,
        requested: 4,
    })
}

/// Handler for POST /warm/trainers/:trainer_id
pub async fn warm_trainer_handler(
    State(state): State<AppState>,
    Path(trainer_id): Path<String>,
) -> Json<WarmResponse> {
    let loaded = state.accessors.warm_trainer(&trainer_id).await;
    Json(WarmResponse {
        loaded,
        requested: 3,
    })
}

/// Handler for POST /warm/admin
pub async fn warm_admin_handler(State(state): State<AppState>) -> Json<WarmResponse> {
    let loaded = state.accessors.warm_admin().await;
    Json(WarmResponse {
        loaded,
        requested: 2,
    })
}

// == Diagnostics ==

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.cache.read().await;
    Json(StatsResponse::from(cache.stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessors::stub::StubBackend;
    use crate::config::CacheConfig;
    use crate::error::BackendError;

    fn test_state() -> (AppState, Arc<StubBackend>) {
        let cache = shared(CacheStore::new(
            CacheConfig::default(),
            Arc::new(MemoryStorage::new()),
        ));
        let backend = Arc::new(StubBackend::new());
        (AppState::new(cache, backend.clone()), backend)
    }

    #[tokio::test]
    async fn test_profile_handler_caches() {
        let (state, backend) = test_state();

        let first = profile_handler(State(state.clone()), Path("u-1".to_string()))
            .await
            .unwrap();
        let second = profile_handler(State(state.clone()), Path("u-1".to_string()))
            .await
            .unwrap();

        assert_eq!(first.0, second.0);
        assert_eq!(backend.calls("fetch_profile"), 1);
    }

    #[tokio::test]
    async fn test_profile_handler_not_found() {
        let (state, _) = test_state();

        let result = profile_handler(State(state), Path("missing".to_string())).await;
        assert!(matches!(
            result,
            Err(ApiError::Backend(BackendError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_articles_handler_rejects_bad_limit() {
        let (state, backend) = test_state();

        let result = articles_handler(State(state), Query(ArticlesQuery { limit: Some(0) })).await;
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
        assert_eq!(backend.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_invalidate_handler() {
        let (state, backend) = test_state();

        trainer_programs_handler(State(state.clone()), Path("t-1".to_string()))
            .await
            .unwrap();

        let req = InvalidateRequest {
            scope: InvalidationScope::TrainerData,
            id: None,
        };
        invalidate_handler(State(state.clone()), Json(req))
            .await
            .unwrap();

        trainer_programs_handler(State(state), Path("t-1".to_string()))
            .await
            .unwrap();
        assert_eq!(backend.calls("fetch_trainer_programs"), 2);
    }

    #[tokio::test]
    async fn test_invalidate_handler_requires_id() {
        let (state, _) = test_state();

        let req = InvalidateRequest {
            scope: InvalidationScope::UserProfile,
            id: None,
        };
        let result = invalidate_handler(State(state), Json(req)).await;
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_clear_handler_bumps_version() {
        let (state, _) = test_state();

        let response = clear_handler(State(state)).await;
        assert_eq!(response.version, 2);
    }

    #[tokio::test]
    async fn test_warm_handlers() {
        let (state, backend) = test_state();

        assert_eq!(warm_user_handler(State(state.clone()), Path("u-1".to_string())).await.loaded, 4);

        backend.set_failing(true);
        let response = warm_admin_handler(State(state)).await;
        assert_eq!(response.loaded, 0);
        assert_eq!(response.requested, 2);
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let (state, _) = test_state();

        let response = stats_handler(State(state)).await;
        assert_eq!(response.hits, 0);
        assert_eq!(response.misses, 0);
        assert_eq!(response.version, 1);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
