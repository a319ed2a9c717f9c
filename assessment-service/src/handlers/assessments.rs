//! Assessment set handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::utils::ValidatedJson;

use crate::{
    dtos::{CreateAssessmentRequest, CreateQuestionRequest},
    models::{Assessment, Question},
    services::AssessmentError,
    AppState,
};

pub async fn create_assessment(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateAssessmentRequest>,
) -> Result<(StatusCode, Json<Assessment>), AssessmentError> {
    tracing::info!(
        set_name = %payload.set_name,
        questions = payload.questions.len(),
        "Creating assessment"
    );

    let assessment = state.service.create_assessment(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(assessment)))
}

pub async fn list_assessments(
    State(state): State<AppState>,
) -> Result<Json<Vec<Assessment>>, AssessmentError> {
    Ok(Json(state.service.list_assessments().await?))
}

pub async fn get_questions_by_set_name(
    State(state): State<AppState>,
    Path(set_name): Path<String>,
) -> Result<Json<Vec<Question>>, AssessmentError> {
    Ok(Json(
        state.service.get_questions_by_set_name(&set_name).await?,
    ))
}

pub async fn get_questions_by_set_id(
    State(state): State<AppState>,
    Path(set_id): Path<i64>,
) -> Result<Json<Vec<Question>>, AssessmentError> {
    Ok(Json(state.service.get_questions_by_set_id(set_id).await?))
}

pub async fn add_question(
    State(state): State<AppState>,
    Path(set_id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<CreateQuestionRequest>,
) -> Result<(StatusCode, Json<Question>), AssessmentError> {
    let question = state.service.add_question(set_id, payload.into()).await?;
    Ok((StatusCode::CREATED, Json(question)))
}
