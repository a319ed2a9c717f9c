//! Resolution of assessment sets against assessment-service.

use crate::config::AssessmentServiceConfig;
use crate::models::{QuestionSummary, SetSummary};
use crate::services::metrics::record_set_lookup;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use service_core::error::AppError;
use service_core::http::{retry_http_call, RetryConfig};
use service_core::observability::TracedClientExt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("assessment set not found")]
    NotFound,

    #[error("assessment service unavailable: {0}")]
    Unavailable(String),
}

/// Looks up an assessment set by id.
#[async_trait]
pub trait SetResolver: Send + Sync {
    async fn resolve_set(&self, set_id: i64) -> Result<SetSummary, ResolveError>;
}

/// `SetResolver` backed by assessment-service's `GET /assessments/{id}/questions`.
pub struct HttpSetResolver {
    client: Client,
    base_url: String,
    retry: RetryConfig,
}

impl HttpSetResolver {
    pub fn new(config: &AssessmentServiceConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            retry: RetryConfig {
                max_retries: config.max_retries,
                ..RetryConfig::quick()
            },
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch(&self, set_id: i64) -> Result<SetSummary, ResolveError> {
        let url = format!("{}/assessments/{}/questions", self.base_url, set_id);

        let response = retry_http_call(&self.retry, "resolve_set", || {
            self.client.traced_get(&url).send()
        })
        .await
        .map_err(|e| ResolveError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ResolveError::NotFound);
        }
        if !status.is_success() {
            return Err(ResolveError::Unavailable(format!(
                "unexpected status {}",
                status
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ResolveError::Unavailable(e.to_string()))?;

        // assessment-service answers an unknown set with 200 and a plain-text message
        match serde_json::from_slice::<Vec<QuestionSummary>>(&body) {
            Ok(questions) => Ok(SetSummary { set_id, questions }),
            Err(_) => {
                debug!(
                    set_id = set_id,
                    body = %String::from_utf8_lossy(&body),
                    "Assessment service did not return a question list"
                );
                Err(ResolveError::NotFound)
            }
        }
    }
}

#[async_trait]
impl SetResolver for HttpSetResolver {
    #[instrument(skip(self))]
    async fn resolve_set(&self, set_id: i64) -> Result<SetSummary, ResolveError> {
        let result = self.fetch(set_id).await;
        match &result {
            Ok(_) => record_set_lookup("found"),
            Err(ResolveError::NotFound) => record_set_lookup("not_found"),
            Err(ResolveError::Unavailable(reason)) => {
                warn!(set_id = set_id, reason = %reason, "Assessment set lookup failed");
                record_set_lookup("unavailable");
            }
        }
        result
    }
}
