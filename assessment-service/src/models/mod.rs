//! Domain models for assessment-service.

use serde::{Deserialize, Serialize};

/// A uniquely named set of questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub set_id: i64,
    pub set_name: String,
    pub questions: Vec<Question>,
}

impl Assessment {
    pub fn question_mut(&mut self, question_id: i64) -> Option<&mut Question> {
        self.questions
            .iter_mut()
            .find(|q| q.question_id == question_id)
    }

    /// Remove a question from this set's collection, returning it if it was present.
    pub fn remove_question(&mut self, question_id: i64) -> Option<Question> {
        let index = self
            .questions
            .iter()
            .position(|q| q.question_id == question_id)?;
        Some(self.questions.remove(index))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question_id: i64,
    pub question_text: String,
    pub answers: Vec<Answer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub value: String,
    pub suggestion: String,
}

impl Answer {
    pub fn new(value: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            suggestion: suggestion.into(),
        }
    }
}

/// An assessment that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAssessment {
    pub set_name: String,
    pub questions: Vec<NewQuestion>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub question_text: String,
    pub answers: Vec<Answer>,
}
