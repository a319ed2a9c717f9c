//! Business errors for survey operations.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use service_core::error::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SurveyError {
    /// The survey, or the assessment set it references, could not be found.
    #[error("{0}")]
    SetNotFound(String),

    #[error(transparent)]
    App(#[from] AppError),
}

impl SurveyError {
    pub fn set_not_found(message: &str) -> Self {
        SurveyError::SetNotFound(message.to_string())
    }
}

/// Lookup failures answer 200 with the message as a plain-text body, the same
/// convention assessment-service follows.
impl IntoResponse for SurveyError {
    fn into_response(self) -> Response {
        match self {
            SurveyError::SetNotFound(message) => (StatusCode::OK, message).into_response(),
            SurveyError::App(err) => err.into_response(),
        }
    }
}
