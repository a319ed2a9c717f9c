//! Survey business operations.
//!
//! Every operation that takes a survey id checks that the survey exists before
//! touching anything else; handlers never query the stores themselves.

use crate::dtos::SurveyResponse;
use crate::models::{Email, NewEmail, NewSurvey, Survey};
use crate::services::assessment_client::SetResolver;
use crate::services::error::SurveyError;
use crate::services::metrics::{record_emails_added, record_operation};
use crate::services::store::{EmailStore, SurveyStore};
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub const SET_NOT_FOUND: &str = "Set name not found.";
pub const INVALID_SURVEY_ID: &str = "Invalid surveyId";
pub const SURVEY_ID_NOT_FOUND: &str = "surveyId not found";

#[derive(Clone)]
pub struct SurveyService {
    surveys: Arc<dyn SurveyStore>,
    emails: Arc<dyn EmailStore>,
    resolver: Arc<dyn SetResolver>,
}

fn observe<T>(operation: &str, result: Result<T, SurveyError>) -> Result<T, SurveyError> {
    match &result {
        Ok(_) => record_operation(operation, "ok"),
        Err(SurveyError::SetNotFound(message)) => {
            warn!(operation = operation, message = %message, "Survey operation rejected");
            record_operation(operation, "not_found");
        }
        Err(SurveyError::App(e)) => {
            tracing::error!(operation = operation, error = %e, "Survey operation failed");
            record_operation(operation, "error");
        }
    }
    result
}

impl SurveyService {
    pub fn new(
        surveys: Arc<dyn SurveyStore>,
        emails: Arc<dyn EmailStore>,
        resolver: Arc<dyn SetResolver>,
    ) -> Self {
        Self {
            surveys,
            emails,
            resolver,
        }
    }

    /// Attach the questions of the survey's assessment set.
    async fn enrich(&self, survey: Survey) -> Result<SurveyResponse, SurveyError> {
        match self.resolver.resolve_set(survey.set_id).await {
            Ok(set) => Ok(SurveyResponse::new(survey, set.questions)),
            Err(e) => {
                warn!(set_id = survey.set_id, error = %e, "Assessment set could not be resolved");
                Err(SurveyError::set_not_found(SET_NOT_FOUND))
            }
        }
    }

    async fn require_survey(&self, survey_id: i64, message: &str) -> Result<Survey, SurveyError> {
        self.surveys
            .find_by_id(survey_id)
            .await?
            .ok_or_else(|| SurveyError::set_not_found(message))
    }

    /// Create a survey. The set is resolved first, so an unknown set persists nothing.
    #[instrument(skip(self, survey), fields(set_id = survey.set_id))]
    pub async fn add_survey(&self, survey: NewSurvey) -> Result<SurveyResponse, SurveyError> {
        let result = async {
            let set = self.resolver.resolve_set(survey.set_id).await.map_err(|e| {
                warn!(error = %e, "Rejecting survey for unresolvable set");
                SurveyError::set_not_found(SET_NOT_FOUND)
            })?;

            let survey = self.surveys.create(survey).await?;
            info!(survey_id = survey.survey_id, "Survey created");
            Ok::<_, SurveyError>(SurveyResponse::new(survey, set.questions))
        }
        .await;
        observe("add_survey", result)
    }

    /// All surveys with their sets; fails if any set cannot be resolved.
    #[instrument(skip(self))]
    pub async fn list_surveys(&self) -> Result<Vec<SurveyResponse>, SurveyError> {
        let result = async {
            let surveys = self.surveys.find_all().await?;
            let mut responses = Vec::with_capacity(surveys.len());
            for survey in surveys {
                responses.push(self.enrich(survey).await?);
            }
            Ok::<_, SurveyError>(responses)
        }
        .await;
        observe("list_surveys", result)
    }

    #[instrument(skip(self))]
    pub async fn get_survey_by_id(&self, survey_id: i64) -> Result<SurveyResponse, SurveyError> {
        let result = async {
            let survey = self.require_survey(survey_id, INVALID_SURVEY_ID).await?;
            self.enrich(survey).await
        }
        .await;
        observe("get_survey_by_id", result)
    }

    /// Register invitees, one PENDING email per address, saved as one batch.
    #[instrument(skip(self, addresses), fields(count = addresses.len()))]
    pub async fn add_emails(
        &self,
        survey_id: i64,
        addresses: Vec<String>,
    ) -> Result<Vec<Email>, SurveyError> {
        let result = async {
            let survey = self.require_survey(survey_id, SURVEY_ID_NOT_FOUND).await?;

            let batch = addresses
                .into_iter()
                .map(|address| NewEmail::pending(survey.survey_id, address))
                .collect();
            let emails = self.emails.save_all(batch).await?;

            record_emails_added(emails.len());
            info!(count = emails.len(), "Emails added to survey");
            Ok::<_, SurveyError>(emails)
        }
        .await;
        observe("add_emails", result)
    }

    #[instrument(skip(self))]
    pub async fn get_emails(&self, survey_id: i64) -> Result<Vec<Email>, SurveyError> {
        let result = async {
            let survey = self.require_survey(survey_id, SURVEY_ID_NOT_FOUND).await?;
            Ok::<_, SurveyError>(self.emails.find_by_survey_id(survey.survey_id).await?)
        }
        .await;
        observe("get_emails", result)
    }
}
