//! Single-question handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use service_core::utils::ValidatedJson;
use std::collections::HashMap;

use crate::{
    dtos::AnswerList,
    models::Question,
    services::AssessmentError,
    AppState,
};

/// Overwrite the answers of a question. The body is the complete new answer list.
pub async fn update_question(
    State(state): State<AppState>,
    Path((set_id, question_id)): Path<(i64, i64)>,
    ValidatedJson(answers): ValidatedJson<AnswerList>,
) -> Result<String, AssessmentError> {
    tracing::info!(
        set_id = set_id,
        question_id = question_id,
        answers = answers.0.len(),
        "Updating question answers"
    );

    let answers = answers.into();
    state
        .service
        .update_question(set_id, question_id, answers)
        .await
}

pub async fn delete_question(
    State(state): State<AppState>,
    Path((set_id, question_id)): Path<(i64, i64)>,
) -> Result<Json<HashMap<String, String>>, AssessmentError> {
    tracing::info!(set_id = set_id, question_id = question_id, "Deleting question");

    Ok(Json(
        state.service.delete_question(set_id, question_id).await?,
    ))
}

/// Responds with `null` for an unknown id.
pub async fn fetch_question(
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
) -> Result<Json<Option<Question>>, AssessmentError> {
    Ok(Json(state.service.fetch_question(question_id).await?))
}
