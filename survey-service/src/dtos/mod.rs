//! Request and response bodies for the survey HTTP API.

use crate::models::{NewSurvey, QuestionSummary, Survey};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use std::borrow::Cow;
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

/// Survey validity window applied when no end date is given.
pub const DEFAULT_SURVEY_DAYS: i64 = 30;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SurveyRequest {
    #[validate(length(min = 1, message = "requestor must not be empty"))]
    pub requestor: String,
    #[validate(length(min = 1, message = "company_name must not be empty"))]
    pub company_name: String,
    pub set_id: i64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl SurveyRequest {
    /// Fill in default dates: start today, end `DEFAULT_SURVEY_DAYS` after start.
    pub fn into_new_survey(self, today: NaiveDate) -> Result<NewSurvey, AppError> {
        let start_date = self.start_date.unwrap_or(today);
        let end_date = match self.end_date {
            Some(end_date) => end_date,
            None => start_date
                .checked_add_signed(Duration::days(DEFAULT_SURVEY_DAYS))
                .ok_or_else(|| {
                    AppError::BadRequest(anyhow::anyhow!(
                        "start_date {} leaves no room for a default end_date",
                        start_date
                    ))
                })?,
        };

        if end_date < start_date {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "end_date {} is before start_date {}",
                end_date,
                start_date
            )));
        }

        Ok(NewSurvey {
            requestor: self.requestor,
            company_name: self.company_name,
            set_id: self.set_id,
            start_date,
            end_date,
        })
    }
}

/// Invitee addresses, sent as a bare JSON array.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct EmailList(pub Vec<String>);

impl Validate for EmailList {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for address in self.0.iter().filter(|a| !a.validate_email()) {
            let mut error = ValidationError::new("email");
            error.message = Some(Cow::from(format!("invalid email address: {}", address)));
            errors.add("emails", error);
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// A survey together with the questions of its assessment set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyResponse {
    pub survey_id: i64,
    pub requestor: String,
    pub company_name: String,
    pub set_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub questions: Vec<QuestionSummary>,
}

impl SurveyResponse {
    pub fn new(survey: Survey, questions: Vec<QuestionSummary>) -> Self {
        Self {
            survey_id: survey.survey_id,
            requestor: survey.requestor,
            company_name: survey.company_name,
            set_id: survey.set_id,
            start_date: survey.start_date,
            end_date: survey.end_date,
            questions,
        }
    }
}
