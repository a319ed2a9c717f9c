//! Request and response bodies for the assessment HTTP API.

use crate::models::{Answer, NewAssessment, NewQuestion};
use serde::Deserialize;
use validator::{Validate, ValidationErrors};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAssessmentRequest {
    #[validate(length(min = 1, message = "set_name must not be empty"))]
    pub set_name: String,
    #[serde(default)]
    #[validate(nested)]
    pub questions: Vec<CreateQuestionRequest>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, message = "question_text must not be empty"))]
    pub question_text: String,
    #[serde(default)]
    #[validate(nested)]
    pub answers: Vec<AnswerPayload>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AnswerPayload {
    #[validate(length(min = 1, message = "value must not be empty"))]
    pub value: String,
    #[serde(default)]
    pub suggestion: String,
}

/// Replacement answer list for a question, sent as a bare JSON array.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct AnswerList(pub Vec<AnswerPayload>);

impl Validate for AnswerList {
    fn validate(&self) -> Result<(), ValidationErrors> {
        self.0.iter().try_for_each(|answer| answer.validate())
    }
}

impl From<AnswerList> for Vec<Answer> {
    fn from(list: AnswerList) -> Self {
        list.0.into_iter().map(Answer::from).collect()
    }
}

impl From<AnswerPayload> for Answer {
    fn from(payload: AnswerPayload) -> Self {
        Answer {
            value: payload.value,
            suggestion: payload.suggestion,
        }
    }
}

impl From<CreateQuestionRequest> for NewQuestion {
    fn from(req: CreateQuestionRequest) -> Self {
        NewQuestion {
            question_text: req.question_text,
            answers: req.answers.into_iter().map(Answer::from).collect(),
        }
    }
}

impl From<CreateAssessmentRequest> for NewAssessment {
    fn from(req: CreateAssessmentRequest) -> Self {
        NewAssessment {
            set_name: req.set_name,
            questions: req.questions.into_iter().map(NewQuestion::from).collect(),
        }
    }
}
