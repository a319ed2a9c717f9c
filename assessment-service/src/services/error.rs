//! Business errors for assessment operations.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use service_core::error::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssessmentError {
    #[error("{0}")]
    NotFound(String),

    #[error("set already exists")]
    Conflict,

    #[error(transparent)]
    App(#[from] AppError),
}

impl AssessmentError {
    pub fn not_found(message: &str) -> Self {
        AssessmentError::NotFound(message.to_string())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AssessmentError::NotFound(_) => "not_found",
            AssessmentError::Conflict => "conflict",
            AssessmentError::App(_) => "error",
        }
    }
}

/// Lookup failures answer 200 with the message as a plain-text body, which existing
/// clients of this API rely on.
impl IntoResponse for AssessmentError {
    fn into_response(self) -> Response {
        match self {
            AssessmentError::NotFound(message) => (StatusCode::OK, message).into_response(),
            AssessmentError::Conflict => {
                (StatusCode::OK, AssessmentError::Conflict.to_string()).into_response()
            }
            AssessmentError::App(err) => err.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn not_found_renders_message_with_ok_status() {
        let response = AssessmentError::not_found("set id is invalid").into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "set id is invalid");
    }

    #[tokio::test]
    async fn conflict_renders_fixed_message() {
        let response = AssessmentError::Conflict.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "set already exists");
    }

    #[tokio::test]
    async fn infrastructure_errors_keep_standard_status() {
        let response = AssessmentError::from(AppError::ServiceUnavailable).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
