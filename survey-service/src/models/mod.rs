//! Domain models for survey-service.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Survey {
    pub survey_id: i64,
    pub requestor: String,
    pub company_name: String,
    pub set_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// A survey that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSurvey {
    pub requestor: String,
    pub company_name: String,
    pub set_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EmailStatus {
    Pending,
    Sent,
    Failed,
}

impl EmailStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailStatus::Pending => "PENDING",
            EmailStatus::Sent => "SENT",
            EmailStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for EmailStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmailStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(EmailStatus::Pending),
            "SENT" => Ok(EmailStatus::Sent),
            "FAILED" => Ok(EmailStatus::Failed),
            other => Err(format!("unknown email status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub id: i64,
    pub email: String,
    pub survey_id: i64,
    pub status: EmailStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmail {
    pub email: String,
    pub survey_id: i64,
    pub status: EmailStatus,
}

impl NewEmail {
    pub fn pending(survey_id: i64, email: String) -> Self {
        Self {
            email,
            survey_id,
            status: EmailStatus::Pending,
        }
    }
}

// ============================================================================
// Assessment set views, as served by assessment-service
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSummary {
    pub value: String,
    #[serde(default)]
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSummary {
    pub question_id: i64,
    pub question_text: String,
    #[serde(default)]
    pub answers: Vec<AnswerSummary>,
}

/// A resolved assessment set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetSummary {
    pub set_id: i64,
    pub questions: Vec<QuestionSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_status_is_upper_case_everywhere() {
        assert_eq!(
            serde_json::to_value(EmailStatus::Pending).unwrap(),
            serde_json::json!("PENDING")
        );
        assert_eq!("SENT".parse::<EmailStatus>().unwrap(), EmailStatus::Sent);
        assert_eq!(EmailStatus::Failed.to_string(), "FAILED");
        assert!("sent".parse::<EmailStatus>().is_err());
    }

    #[test]
    fn question_summary_tolerates_missing_answers() {
        let q: QuestionSummary =
            serde_json::from_str(r#"{"question_id": 3, "question_text": "Why?"}"#).unwrap();
        assert!(q.answers.is_empty());
    }
}
