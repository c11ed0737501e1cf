//! Backend Module
//!
//! The remote data source consulted on cache misses.

use async_trait::async_trait;

use crate::error::BackendError;
use crate::models::{
    Article, Entitlement, ProgramAssignment, ProgramTemplate, TrainerClient, UserProfile,
    WorkoutProgram,
};

/// Convenience Result type for backend reads.
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Row counts that feed the admin dashboard aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountedResource {
    Users,
    ActiveSubscriptions,
    Programs,
    PublishedArticles,
}

// == Backend Trait ==
/// One asynchronous read per named resource.
///
/// The cache treats implementations as opaque: their errors are passed to the
/// caller unchanged and nothing is cached for a failed read.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Profile row for `user_id`. Missing rows are `BackendError::NotFound`.
    async fn fetch_profile(&self, user_id: &str) -> BackendResult<UserProfile>;

    async fn fetch_entitlements(&self, user_id: &str) -> BackendResult<Vec<Entitlement>>;

    async fn fetch_assignments(&self, client_id: &str) -> BackendResult<Vec<ProgramAssignment>>;

    async fn fetch_trainer_programs(&self, trainer_id: &str) -> BackendResult<Vec<WorkoutProgram>>;

    async fn fetch_trainer_templates(
        &self,
        trainer_id: &str,
    ) -> BackendResult<Vec<ProgramTemplate>>;

    async fn fetch_trainer_clients(&self, trainer_id: &str) -> BackendResult<Vec<TrainerClient>>;

    /// Public program catalogue.
    async fn fetch_workout_programs(&self) -> BackendResult<Vec<WorkoutProgram>>;

    /// Newest published articles first.
    async fn fetch_published_articles(&self, limit: usize) -> BackendResult<Vec<Article>>;

    async fn count(&self, resource: CountedResource) -> BackendResult<u64>;
}
