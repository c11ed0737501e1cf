//! Request DTOs for the gateway API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

use crate::accessors::{DEFAULT_ARTICLE_LIMIT, MAX_ARTICLE_LIMIT};

/// Which family of cached reads an invalidation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidationScope {
    UserProfile,
    UserEntitlements,
    ClientAssignments,
    Trainer,
    TrainerData,
    WorkoutPrograms,
    Articles,
    AdminStats,
    All,
}

impl InvalidationScope {
    /// Scopes that address one user or trainer and so need an `id`.
    pub fn requires_id(self) -> bool {
        matches!(
            self,
            InvalidationScope::UserProfile
                | InvalidationScope::UserEntitlements
                | InvalidationScope::ClientAssignments
                | InvalidationScope::Trainer
        )
    }
}

/// Request body for POST /invalidate
///
/// # Fields
/// - `scope`: The family of entries to drop
/// - `id`: User or trainer id, required by per-entity scopes
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateRequest {
    pub scope: InvalidationScope,
    #[serde(default)]
    pub id: Option<String>,
}

impl InvalidateRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        let id_missing = self.id.as_deref().map_or(true, str::is_empty);
        if self.scope.requires_id() && id_missing {
            return Some(format!("Scope {:?} requires an id", self.scope));
        }
        None
    }
}

/// Query string for GET /articles
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticlesQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

impl ArticlesQuery {
    /// Resolves the page size, rejecting values outside `1..=MAX_ARTICLE_LIMIT`.
    pub fn effective_limit(&self) -> Result<usize, String> {
        match self.limit {
            None => Ok(DEFAULT_ARTICLE_LIMIT),
            Some(limit) if (1..=MAX_ARTICLE_LIMIT).contains(&limit) => Ok(limit),
            Some(limit) => Err(format!(
                "limit must be between 1 and {}, got {}",
                MAX_ARTICLE_LIMIT, limit
            )),
        }
    }
}
