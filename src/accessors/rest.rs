//! REST Backend Module
//!
//! `Backend` over the hosted database's PostgREST-style HTTP interface.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::backend::{Backend, BackendResult, CountedResource};
use crate::config::Config;
use crate::error::BackendError;
use crate::models::{
    Article, Entitlement, ProgramAssignment, ProgramTemplate, TrainerClient, UserProfile,
    WorkoutProgram,
};

const PROFILES: &str = "profiles";
const SUBSCRIPTIONS: &str = "subscriptions";
const WORKOUT_PROGRAMS: &str = "workout_programs";
const PROGRAM_TEMPLATES: &str = "program_templates";
const TRAINER_CLIENTS: &str = "trainer_clients";
const PROGRAM_ASSIGNMENTS: &str = "program_assignments";
const ARTICLES: &str = "articles";

type Query = Vec<(&'static str, String)>;

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

// == Rest Backend ==
/// Reads rows from `<base_url>/rest/v1/<table>`, authenticating with an API key.
#[derive(Debug, Clone)]
pub struct RestBackend {
    client: Client,
    base_url: String,
}

impl RestBackend {
    /// Builds a backend with the key sent as both `apikey` and bearer token.
    pub fn new(
        base_url: impl Into<String>,
        api_key: &str,
        timeout: Duration,
    ) -> BackendResult<Self> {
        let mut headers = HeaderMap::new();
        if !api_key.is_empty() {
            let key = HeaderValue::from_str(api_key)
                .map_err(|e| BackendError::Request(format!("invalid api key: {}", e)))?;
            let bearer = HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| BackendError::Request(format!("invalid api key: {}", e)))?;
            headers.insert("apikey", key);
            headers.insert(AUTHORIZATION, bearer);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> BackendResult<Self> {
        Self::new(
            config.backend_url.clone(),
            &config.backend_api_key,
            Duration::from_secs(config.backend_timeout),
        )
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn send(request: RequestBuilder) -> BackendResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(BackendError::Status {
            status: status.as_u16(),
            body,
        })
    }

    /// Selects every column of the rows matching `query`.
    async fn select<T: DeserializeOwned>(&self, table: &str, mut query: Query) -> BackendResult<Vec<T>> {
        query.push(("select", "*".to_string()));
        debug!("Backend select from {}", table);

        let request = self.client.get(self.table_url(table)).query(&query);
        let rows = Self::send(request).await?.json::<Vec<T>>().await?;
        Ok(rows)
    }

    /// Exact row count, read from the `Content-Range` header of a HEAD request.
    async fn count_rows(&self, table: &str, mut query: Query) -> BackendResult<u64> {
        query.push(("select", "id".to_string()));
        debug!("Backend count on {}", table);

        let request = self
            .client
            .head(self.table_url(table))
            .query(&query)
            .header("Prefer", "count=exact");
        let response = Self::send(request).await?;

        response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total)
            .ok_or_else(|| {
                BackendError::Decode(format!("missing or invalid content-range for {}", table))
            })
    }
}

/// Extracts the total from a `Content-Range` value such as `0-24/3573` or `*/0`.
pub fn parse_content_range_total(value: &str) -> Option<u64> {
    let (_, total) = value.rsplit_once('/')?;
    total.trim().parse().ok()
}

#[async_trait]
impl Backend for RestBackend {
    async fn fetch_profile(&self, user_id: &str) -> BackendResult<UserProfile> {
        let rows: Vec<UserProfile> = self
            .select(PROFILES, vec![("id", eq(user_id)), ("limit", "1".to_string())])
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound(format!("profile {}", user_id)))
    }

    async fn fetch_entitlements(&self, user_id: &str) -> BackendResult<Vec<Entitlement>> {
        self.select(SUBSCRIPTIONS, vec![("user_id", eq(user_id))])
            .await
    }

    async fn fetch_assignments(&self, client_id: &str) -> BackendResult<Vec<ProgramAssignment>> {
        self.select(
            PROGRAM_ASSIGNMENTS,
            vec![
                ("client_id", eq(client_id)),
                ("order", "assigned_at.desc".to_string()),
            ],
        )
        .await
    }

    async fn fetch_trainer_programs(&self, trainer_id: &str) -> BackendResult<Vec<WorkoutProgram>> {
        self.select(
            WORKOUT_PROGRAMS,
            vec![
                ("trainer_id", eq(trainer_id)),
                ("order", "title.asc".to_string()),
            ],
        )
        .await
    }

    async fn fetch_trainer_templates(
        &self,
        trainer_id: &str,
    ) -> BackendResult<Vec<ProgramTemplate>> {
        self.select(PROGRAM_TEMPLATES, vec![("trainer_id", eq(trainer_id))])
            .await
    }

    async fn fetch_trainer_clients(&self, trainer_id: &str) -> BackendResult<Vec<TrainerClient>> {
        self.select(TRAINER_CLIENTS, vec![("trainer_id", eq(trainer_id))])
            .await
    }

    async fn fetch_workout_programs(&self) -> BackendResult<Vec<WorkoutProgram>> {
        self.select(WORKOUT_PROGRAMS, vec![("order", "title.asc".to_string())])
            .await
    }

    async fn fetch_published_articles(&self, limit: usize) -> BackendResult<Vec<Article>> {
        self.select(
            ARTICLES,
            vec![
                ("status", eq("published")),
                ("order", "published_at.desc".to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    async fn count(&self, resource: CountedResource) -> BackendResult<u64> {
        match resource {
            CountedResource::Users => self.count_rows(PROFILES, Vec::new()).await,
            CountedResource::ActiveSubscriptions => {
                self.count_rows(SUBSCRIPTIONS, vec![("status", eq("active"))])
                    .await
            }
            CountedResource::Programs => self.count_rows(WORKOUT_PROGRAMS, Vec::new()).await,
            CountedResource::PublishedArticles => {
                self.count_rows(ARTICLES, vec![("status", eq("published"))])
                    .await
            }
        }
    }
}
