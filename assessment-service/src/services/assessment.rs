//! Assessment business operations.

use crate::models::{Answer, Assessment, NewAssessment, NewQuestion, Question};
use crate::services::error::AssessmentError;
use crate::services::metrics::record_operation;
use crate::services::store::{AssessmentStore, QuestionStore};
use service_core::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub const SET_NAME_INVALID: &str = "set name is invalid";
pub const SET_ID_INVALID: &str = "set id is invalid";
pub const SET_INVALID: &str = "Set name is invalid";
pub const QUESTION_ID_INVALID: &str = "Question id is invalid";
pub const QUESTION_NOT_FOUND: &str = "question is not found";
pub const QUESTION_UPDATED: &str = "Question updated successfully";
pub const QUESTION_DELETED: &str = "Question deleted successfully";

#[derive(Clone)]
pub struct AssessmentService {
    assessments: Arc<dyn AssessmentStore>,
    questions: Arc<dyn QuestionStore>,
}

fn observe<T>(operation: &str, result: Result<T, AssessmentError>) -> Result<T, AssessmentError> {
    match &result {
        Ok(_) => record_operation(operation, "ok"),
        Err(AssessmentError::App(e)) => {
            tracing::error!(operation = operation, error = %e, "Assessment operation failed");
            record_operation(operation, "error");
        }
        Err(e) => {
            warn!(operation = operation, error = %e, "Assessment operation rejected");
            record_operation(operation, e.kind());
        }
    }
    result
}

impl AssessmentService {
    pub fn new(assessments: Arc<dyn AssessmentStore>, questions: Arc<dyn QuestionStore>) -> Self {
        Self {
            assessments,
            questions,
        }
    }

    async fn load_set(&self, set_id: i64) -> Result<Assessment, AssessmentError> {
        self.assessments
            .find_by_id(set_id)
            .await?
            .ok_or_else(|| AssessmentError::not_found(SET_INVALID))
    }

    #[instrument(skip(self, assessment), fields(set_name = %assessment.set_name))]
    pub async fn create_assessment(
        &self,
        assessment: NewAssessment,
    ) -> Result<Assessment, AssessmentError> {
        let result = match self.assessments.create(assessment).await {
            Ok(created) => {
                info!(set_id = created.set_id, "Assessment created");
                Ok(created)
            }
            Err(AppError::Conflict(_)) => Err(AssessmentError::Conflict),
            Err(e) => Err(e.into()),
        };
        observe("create_assessment", result)
    }

    #[instrument(skip(self))]
    pub async fn list_assessments(&self) -> Result<Vec<Assessment>, AssessmentError> {
        let result = self.assessments.find_all().await.map_err(Into::into);
        observe("list_assessments", result)
    }

    #[instrument(skip(self))]
    pub async fn get_questions_by_set_name(
        &self,
        set_name: &str,
    ) -> Result<Vec<Question>, AssessmentError> {
        let result = async {
            let assessment = self
                .assessments
                .find_by_set_name(set_name)
                .await?
                .ok_or_else(|| AssessmentError::not_found(SET_NAME_INVALID))?;
            Ok::<_, AssessmentError>(assessment.questions)
        }
        .await;
        observe("get_questions_by_set_name", result)
    }

    #[instrument(skip(self))]
    pub async fn get_questions_by_set_id(
        &self,
        set_id: i64,
    ) -> Result<Vec<Question>, AssessmentError> {
        let result = async {
            let assessment = self
                .assessments
                .find_by_id(set_id)
                .await?
                .ok_or_else(|| AssessmentError::not_found(SET_ID_INVALID))?;
            Ok::<_, AssessmentError>(assessment.questions)
        }
        .await;
        observe("get_questions_by_set_id", result)
    }

    #[instrument(skip(self, question))]
    pub async fn add_question(
        &self,
        set_id: i64,
        question: NewQuestion,
    ) -> Result<Question, AssessmentError> {
        let result = async {
            let assessment = self.load_set(set_id).await?;
            let question = self.questions.add(assessment.set_id, question).await?;
            info!(question_id = question.question_id, "Question added");
            Ok::<_, AssessmentError>(question)
        }
        .await;
        observe("add_question", result)
    }

    /// Replace a question's answers wholesale, then persist the question and its set.
    #[instrument(skip(self, answers), fields(answer_count = answers.len()))]
    pub async fn update_question(
        &self,
        set_id: i64,
        question_id: i64,
        answers: Vec<Answer>,
    ) -> Result<String, AssessmentError> {
        let result = async {
            let mut assessment = self.load_set(set_id).await?;
            let question = assessment
                .question_mut(question_id)
                .ok_or_else(|| AssessmentError::not_found(QUESTION_ID_INVALID))?;

            question.answers = answers;
            self.questions.save(question).await?;
            self.assessments.save(&assessment).await?;

            info!("Question updated");
            Ok::<_, AssessmentError>(QUESTION_UPDATED.to_string())
        }
        .await;
        observe("update_question", result)
    }

    /// Drop a question from its set and from the store.
    #[instrument(skip(self))]
    pub async fn delete_question(
        &self,
        set_id: i64,
        question_id: i64,
    ) -> Result<HashMap<String, String>, AssessmentError> {
        let result = async {
            let mut assessment = self.load_set(set_id).await?;
            let question = assessment
                .remove_question(question_id)
                .ok_or_else(|| AssessmentError::not_found(QUESTION_NOT_FOUND))?;

            self.assessments.save(&assessment).await?;
            self.questions.delete_by_id(question.question_id).await?;

            info!("Question deleted");
            Ok::<_, AssessmentError>(HashMap::from([(
                "message".to_string(),
                QUESTION_DELETED.to_string(),
            )]))
        }
        .await;
        observe("delete_question", result)
    }

    /// Absence is `Ok(None)`, not an error.
    #[instrument(skip(self))]
    pub async fn fetch_question(
        &self,
        question_id: i64,
    ) -> Result<Option<Question>, AssessmentError> {
        let result = self
            .questions
            .find_by_id(question_id)
            .await
            .map_err(Into::into);
        observe("fetch_question", result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::memory::InMemoryStore;

    fn setup() -> (AssessmentService, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let service = AssessmentService::new(store.clone(), store.clone());
        (service, store)
    }

    fn java() -> NewAssessment {
        NewAssessment {
            set_name: "Java".to_string(),
            questions: vec![NewQuestion {
                question_text: "What is the JVM?".to_string(),
                answers: vec![Answer::new("v1", "s1")],
            }],
        }
    }

    fn message(err: AssessmentError) -> String {
        match err {
            AssessmentError::NotFound(msg) => msg,
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn duplicate_set_name_is_conflict() {
        let (service, _) = setup();
        service.create_assessment(java()).await.unwrap();

        let err = service.create_assessment(java()).await.unwrap_err();
        assert!(matches!(err, AssessmentError::Conflict));
        assert_eq!(service.list_assessments().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn questions_by_unknown_name_or_id() {
        let (service, _) = setup();

        let err = service.get_questions_by_set_name("Go").await.unwrap_err();
        assert_eq!(message(err), "set name is invalid");

        let err = service.get_questions_by_set_id(42).await.unwrap_err();
        assert_eq!(message(err), "set id is invalid");
    }

    #[tokio::test]
    async fn questions_by_name_and_id_match() {
        let (service, _) = setup();
        let created = service.create_assessment(java()).await.unwrap();

        let by_name = service.get_questions_by_set_name("Java").await.unwrap();
        let by_id = service
            .get_questions_by_set_id(created.set_id)
            .await
            .unwrap();

        assert_eq!(by_name, by_id);
        assert_eq!(by_id.len(), 1);
    }

    #[tokio::test]
    async fn update_question_on_unknown_set() {
        let (service, store) = setup();

        let err = service
            .update_question(7, 1, vec![Answer::new("v", "s")])
            .await
            .unwrap_err();

        assert_eq!(message(err), "Set name is invalid");
        assert_eq!(store.question_saves(), 0);
        assert_eq!(store.assessment_saves(), 0);
    }

    #[tokio::test]
    async fn update_question_on_unknown_question() {
        let (service, store) = setup();
        let created = service.create_assessment(java()).await.unwrap();

        let err = service
            .update_question(created.set_id, 999, vec![])
            .await
            .unwrap_err();

        assert_eq!(message(err), "Question id is invalid");
        assert_eq!(store.question_saves(), 0);
    }

    #[tokio::test]
    async fn update_question_saves_question_then_set_once_each() {
        let (service, store) = setup();
        let created = service.create_assessment(java()).await.unwrap();
        let question_id = created.questions[0].question_id;

        let reply = service
            .update_question(created.set_id, question_id, vec![Answer::new("v2", "s2")])
            .await
            .unwrap();

        assert_eq!(reply, "Question updated successfully");
        assert_eq!(store.question_saves(), 1);
        assert_eq!(store.assessment_saves(), 1);
    }

    #[tokio::test]
    async fn update_replaces_answers_instead_of_merging() {
        let (service, _) = setup();
        let created = service.create_assessment(java()).await.unwrap();
        let question_id = created.questions[0].question_id;

        service
            .update_question(created.set_id, question_id, vec![Answer::new("v2", "s2")])
            .await
            .unwrap();

        let fetched = service.fetch_question(question_id).await.unwrap().unwrap();
        assert_eq!(fetched.answers, vec![Answer::new("v2", "s2")]);
    }

    #[tokio::test]
    async fn delete_question_messages() {
        let (service, store) = setup();

        let err = service.delete_question(5, 1).await.unwrap_err();
        assert_eq!(message(err), "Set name is invalid");

        let created = service.create_assessment(java()).await.unwrap();
        let err = service
            .delete_question(created.set_id, 999)
            .await
            .unwrap_err();
        assert_eq!(message(err), "question is not found");
        assert_eq!(store.question_deletes(), 0);
        assert_eq!(store.assessment_saves(), 0);
    }

    #[tokio::test]
    async fn delete_question_removes_from_set_and_store() {
        let (service, store) = setup();
        let created = service.create_assessment(java()).await.unwrap();
        let question_id = created.questions[0].question_id;

        let reply = service
            .delete_question(created.set_id, question_id)
            .await
            .unwrap();

        assert_eq!(reply["message"], "Question deleted successfully");
        assert_eq!(store.assessment_saves(), 1);
        assert_eq!(store.question_deletes(), 1);
        assert!(service.fetch_question(question_id).await.unwrap().is_none());
        assert!(service
            .get_questions_by_set_id(created.set_id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn fetch_unknown_question_is_none() {
        let (service, _) = setup();
        assert!(service.fetch_question(12345).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn add_question_to_unknown_set() {
        let (service, _) = setup();
        let err = service
            .add_question(
                3,
                NewQuestion {
                    question_text: "q".to_string(),
                    answers: vec![],
                },
            )
            .await
            .unwrap_err();
        assert_eq!(message(err), "Set name is invalid");
    }
}
