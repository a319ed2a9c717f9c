//! Survey handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use service_core::utils::ValidatedJson;

use crate::{
    dtos::{SurveyRequest, SurveyResponse},
    services::SurveyError,
    AppState,
};

pub async fn add_survey(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SurveyRequest>,
) -> Result<Json<SurveyResponse>, SurveyError> {
    tracing::info!(
        set_id = payload.set_id,
        company_name = %payload.company_name,
        "Creating survey"
    );

    let survey = payload.into_new_survey(Utc::now().date_naive())?;
    Ok(Json(state.service.add_survey(survey).await?))
}

pub async fn list_surveys(
    State(state): State<AppState>,
) -> Result<Json<Vec<SurveyResponse>>, SurveyError> {
    Ok(Json(state.service.list_surveys().await?))
}

pub async fn get_survey(
    State(state): State<AppState>,
    Path(survey_id): Path<i64>,
) -> Result<Json<SurveyResponse>, SurveyError> {
    Ok(Json(state.service.get_survey_by_id(survey_id).await?))
}
