//! In-memory `Backend` for tests that counts calls and can be told to fail.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::backend::{Backend, BackendResult, CountedResource};
use crate::error::BackendError;
use crate::models::{
    Article, Entitlement, ProgramAssignment, ProgramTemplate, TrainerClient, UserProfile,
    UserRole, WorkoutProgram,
};

#[derive(Debug, Default)]
pub struct StubBackend {
    calls: Mutex<HashMap<&'static str, usize>>,
    failing: AtomicBool,
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with `BackendError::Request`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(method)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    fn record(&self, method: &'static str) -> BackendResult<()> {
        *self.calls.lock().unwrap().entry(method).or_insert(0) += 1;
        if self.failing.load(Ordering::SeqCst) {
            return Err(BackendError::Request("stub backend unavailable".to_string()));
        }
        Ok(())
    }
}

pub fn profile(user_id: &str) -> UserProfile {
    UserProfile {
        id: user_id.to_string(),
        email: format!("{}@example.com", user_id),
        full_name: Some(format!("User {}", user_id)),
        role: UserRole::Client,
        avatar_url: None,
        created_at: None,
    }
}

pub fn program(id: &str, trainer_id: Option<&str>) -> WorkoutProgram {
    WorkoutProgram {
        id: id.to_string(),
        title: format!("Program {}", id),
        description: None,
        difficulty: Some("beginner".to_string()),
        duration_weeks: Some(8),
        is_premium: false,
        trainer_id: trainer_id.map(str::to_string),
    }
}

#[async_trait]
impl Backend for StubBackend {
    async fn fetch_profile(&self, user_id: &str) -> BackendResult<UserProfile> {
        self.record("fetch_profile")?;
        if user_id == "missing" {
            return Err(BackendError::NotFound(format!("profile {}", user_id)));
        }
        Ok(profile(user_id))
    }

    async fn fetch_entitlements(&self, user_id: &str) -> BackendResult<Vec<Entitlement>> {
        self.record("fetch_entitlements")?;
        Ok(vec![Entitlement {
            id: format!("sub-{}", user_id),
            user_id: user_id.to_string(),
            plan: "premium".to_string(),
            status: "active".to_string(),
            current_period_end: None,
        }])
    }

    async fn fetch_assignments(&self, client_id: &str) -> BackendResult<Vec<ProgramAssignment>> {
        self.record("fetch_assignments")?;
        Ok(vec![ProgramAssignment {
            id: format!("asg-{}", client_id),
            program_id: "p-1".to_string(),
            client_id: client_id.to_string(),
            trainer_id: Some("t-1".to_string()),
            assigned_at: None,
            progress: Some(0.25),
        }])
    }

    async fn fetch_trainer_programs(&self, trainer_id: &str) -> BackendResult<Vec<WorkoutProgram>> {
        self.record("fetch_trainer_programs")?;
        Ok(vec![program("p-1", Some(trainer_id))])
    }

    async fn fetch_trainer_templates(
        &self,
        trainer_id: &str,
    ) -> BackendResult<Vec<ProgramTemplate>> {
        self.record("fetch_trainer_templates")?;
        Ok(vec![ProgramTemplate {
            id: "tpl-1".to_string(),
            trainer_id: trainer_id.to_string(),
            name: "Push/Pull/Legs".to_string(),
            description: None,
            exercises: serde_json::json!([]),
        }])
    }

    async fn fetch_trainer_clients(&self, trainer_id: &str) -> BackendResult<Vec<TrainerClient>> {
        self.record("fetch_trainer_clients")?;
        Ok(vec![TrainerClient {
            id: "tc-1".to_string(),
            trainer_id: trainer_id.to_string(),
            client_id: "u-1".to_string(),
            status: "active".to_string(),
            client_name: None,
        }])
    }

    async fn fetch_workout_programs(&self) -> BackendResult<Vec<WorkoutProgram>> {
        self.record("fetch_workout_programs")?;
        Ok(vec![program("p-1", None), program("p-2", None)])
    }

    async fn fetch_published_articles(&self, limit: usize) -> BackendResult<Vec<Article>> {
        self.record("fetch_published_articles")?;
        Ok((0..limit.min(3))
            .map(|i| Article {
                id: format!("a-{}", i),
                title: format!("Article {}", i),
                slug: format!("article-{}", i),
                excerpt: None,
                author_id: None,
                published_at: None,
            })
            .collect())
    }

    async fn count(&self, resource: CountedResource) -> BackendResult<u64> {
        self.record("count")?;
        Ok(match resource {
            CountedResource::Users => 120,
            CountedResource::ActiveSubscriptions => 45,
            CountedResource::Programs => 12,
            CountedResource::PublishedArticles => 30,
        })
    }
}
