//! Domain records read from the hosted database
//!
//! Field names follow the backend's column names so rows deserialize directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account role, decides which dashboards a user sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Client,
    Trainer,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub role: UserRole,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A subscription granting access to gated programs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entitlement {
    pub id: String,
    pub user_id: String,
    pub plan: String,
    pub status: String,
    #[serde(default)]
    pub current_period_end: Option<DateTime<Utc>>,
}

impl Entitlement {
    /// Active status and, when the period end is known, not yet lapsed.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.status == "active" && self.current_period_end.map_or(true, |end| end > now)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutProgram {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub duration_weeks: Option<u32>,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default)]
    pub trainer_id: Option<String>,
}

/// Reusable program skeleton owned by a trainer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramTemplate {
    pub id: String,
    pub trainer_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub exercises: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerClient {
    pub id: String,
    pub trainer_id: String,
    pub client_id: String,
    pub status: String,
    #[serde(default)]
    pub client_name: Option<String>,
}

/// A program assigned to a client, with completion progress in `0.0..=1.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramAssignment {
    pub id: String,
    pub program_id: String,
    pub client_id: String,
    #[serde(default)]
    pub trainer_id: Option<String>,
    #[serde(default)]
    pub assigned_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub progress: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

/// Admin dashboard aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminStats {
    pub total_users: u64,
    pub active_subscriptions: u64,
    pub total_programs: u64,
    pub published_articles: u64,
    pub generated_at: DateTime<Utc>,
}
