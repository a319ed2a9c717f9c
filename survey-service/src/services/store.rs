//! Persistence collaborators used by the survey business service.

use crate::models::{Email, NewEmail, NewSurvey, Survey};
use async_trait::async_trait;
use service_core::error::AppError;

#[async_trait]
pub trait SurveyStore: Send + Sync {
    async fn create(&self, survey: NewSurvey) -> Result<Survey, AppError>;

    async fn find_by_id(&self, survey_id: i64) -> Result<Option<Survey>, AppError>;

    async fn find_all(&self) -> Result<Vec<Survey>, AppError>;
}

#[async_trait]
pub trait EmailStore: Send + Sync {
    /// Persist a batch of emails in one write.
    async fn save_all(&self, emails: Vec<NewEmail>) -> Result<Vec<Email>, AppError>;

    async fn find_by_survey_id(&self, survey_id: i64) -> Result<Vec<Email>, AppError>;
}
