//! Configuration module for survey-service.

use service_core::config::{self as core_config, env_or, DatabaseConfig};
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone)]
pub struct SurveyConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub database: DatabaseConfig,
    pub assessment_service: AssessmentServiceConfig,
}

/// Where and how to reach assessment-service for set lookups.
#[derive(Debug, Clone)]
pub struct AssessmentServiceConfig {
    pub url: String,
    pub timeout_ms: u64,
    pub max_retries: u32,
}

impl AssessmentServiceConfig {
    pub fn from_env() -> Self {
        Self {
            url: env::var("ASSESSMENT_SERVICE_URL")
                .unwrap_or_else(|_| "http://assessment-service:8080".to_string()),
            timeout_ms: env_or("ASSESSMENT_TIMEOUT_MS", 5000),
            max_retries: env_or("ASSESSMENT_MAX_RETRIES", 2),
        }
    }
}

impl SurveyConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        Ok(Self {
            common,
            service_name: env::var("SERVICE_NAME").unwrap_or_else(|_| "survey-service".to_string()),
            service_version: env::var("SERVICE_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            database: DatabaseConfig::from_env(),
            assessment_service: AssessmentServiceConfig::from_env(),
        })
    }
}
