//! Survey invitee email handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use service_core::{error::AppError, utils::ValidatedJson};

use crate::{dtos::EmailList, models::Email, services::SurveyError, AppState};

/// Body is a bare JSON array of addresses. Address syntax is checked by the extractor.
pub async fn add_emails(
    State(state): State<AppState>,
    Path(survey_id): Path<i64>,
    ValidatedJson(EmailList(addresses)): ValidatedJson<EmailList>,
) -> Result<Json<Vec<Email>>, SurveyError> {
    if addresses.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "at least one email address is required"
        ))
        .into());
    }

    tracing::info!(
        survey_id = survey_id,
        count = addresses.len(),
        "Adding survey emails"
    );

    Ok(Json(state.service.add_emails(survey_id, addresses).await?))
}

pub async fn get_emails(
    State(state): State<AppState>,
    Path(survey_id): Path<i64>,
) -> Result<Json<Vec<Email>>, SurveyError> {
    Ok(Json(state.service.get_emails(survey_id).await?))
}
