//! API Routes
//!
//! Configures the Axum router with all gateway endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    admin_stats_handler, articles_handler, assignments_handler, clear_handler,
    entitlements_handler, health_handler, invalidate_handler, profile_handler, programs_handler,
    stats_handler, trainer_clients_handler, trainer_programs_handler, trainer_templates_handler,
    warm_admin_handler, warm_trainer_handler, warm_user_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /profiles/:user_id` - Cached user profile
/// - `GET /users/:user_id/entitlements` - Cached subscriptions
/// - `GET /users/:user_id/assignments` - Cached program assignments
/// - `GET /trainers/:trainer_id/{programs,templates,clients}` - Cached trainer data
/// - `GET /programs` - Cached program catalogue
/// - `GET /articles?limit=N` - Cached published articles
/// - `GET /admin/stats` - Cached dashboard counts
/// - `POST /invalidate` - Scoped invalidation
/// - `POST /warm/{users/:user_id,trainers/:trainer_id,admin}` - Preload a group
/// - `DELETE /cache` - Clear everything and bump the version
/// - `GET /stats` - Cache statistics
/// - `GET /health` - Health check endpoint
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/profiles/:user_id", get(profile_handler))
        .route("/users/:user_id/entitlements", get(entitlements_handler))
        .route("/users/:user_id/assignments", get(assignments_handler))
        .route("/trainers/:trainer_id/programs", get(trainer_programs_handler))
        .route("/trainers/:trainer_id/templates", get(trainer_templates_handler))
        .route("/trainers/:trainer_id/clients", get(trainer_clients_handler))
        .route("/programs", get(programs_handler))
        .route("/articles", get(articles_handler))
        .route("/admin/stats", get(admin_stats_handler))
        .route("/invalidate", post(invalidate_handler))
        .route("/warm/users/:user_id", post(warm_user_handler))
        .route("/warm/trainers/:trainer_id", post(warm_trainer_handler))
        .route("/warm/admin", post(warm_admin_handler))
        .route("/cache", delete(clear_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
