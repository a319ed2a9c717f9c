//! Persistence collaborators used by the assessment business service.

use crate::models::{Assessment, NewAssessment, NewQuestion, Question};
use async_trait::async_trait;
use service_core::error::AppError;

#[async_trait]
pub trait AssessmentStore: Send + Sync {
    /// Insert a set with its questions. A duplicate set name is `AppError::Conflict`.
    async fn create(&self, assessment: NewAssessment) -> Result<Assessment, AppError>;

    async fn find_by_id(&self, set_id: i64) -> Result<Option<Assessment>, AppError>;

    async fn find_by_set_name(&self, set_name: &str) -> Result<Option<Assessment>, AppError>;

    async fn find_all(&self) -> Result<Vec<Assessment>, AppError>;

    /// Update the stored set row. Question membership is owned by `QuestionStore`.
    async fn save(&self, assessment: &Assessment) -> Result<Assessment, AppError>;
}

#[async_trait]
pub trait QuestionStore: Send + Sync {
    async fn find_by_id(&self, question_id: i64) -> Result<Option<Question>, AppError>;

    async fn add(&self, set_id: i64, question: NewQuestion) -> Result<Question, AppError>;

    /// Overwrite the question text and its full answer list.
    async fn save(&self, question: &Question) -> Result<Question, AppError>;

    async fn delete_by_id(&self, question_id: i64) -> Result<(), AppError>;
}
