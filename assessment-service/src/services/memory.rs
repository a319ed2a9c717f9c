//! In-memory store, used when no database is configured and in tests.

use crate::models::{Assessment, NewAssessment, NewQuestion, Question};
use crate::services::store::{AssessmentStore, QuestionStore};
use async_trait::async_trait;
use service_core::error::AppError;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

#[derive(Default)]
struct State {
    next_set_id: i64,
    next_question_id: i64,
    sets: BTreeMap<i64, String>,
    // question id -> (owning set id, question)
    questions: BTreeMap<i64, (i64, Question)>,
}

impl State {
    fn assemble(&self, set_id: i64, set_name: &str) -> Assessment {
        Assessment {
            set_id,
            set_name: set_name.to_string(),
            questions: self
                .questions
                .values()
                .filter(|(owner, _)| *owner == set_id)
                .map(|(_, q)| q.clone())
                .collect(),
        }
    }

    fn name_taken(&self, set_name: &str, except: Option<i64>) -> bool {
        self.sets
            .iter()
            .any(|(id, name)| name == set_name && Some(*id) != except)
    }

    fn insert_question(&mut self, set_id: i64, question: NewQuestion) -> Question {
        self.next_question_id += 1;
        let question = Question {
            question_id: self.next_question_id,
            question_text: question.question_text,
            answers: question.answers,
        };
        self.questions
            .insert(question.question_id, (set_id, question.clone()));
        question
    }
}

/// Store keeping sets and questions in process memory, with write counters.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    assessment_saves: AtomicU64,
    question_saves: AtomicU64,
    question_deletes: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `AssessmentStore::save` calls.
    pub fn assessment_saves(&self) -> u64 {
        self.assessment_saves.load(Ordering::SeqCst)
    }

    /// Number of `QuestionStore::save` calls.
    pub fn question_saves(&self) -> u64 {
        self.question_saves.load(Ordering::SeqCst)
    }

    pub fn question_deletes(&self) -> u64 {
        self.question_deletes.load(Ordering::SeqCst)
    }
}

fn conflict(set_name: &str) -> AppError {
    AppError::Conflict(anyhow::anyhow!("set name '{}' already exists", set_name))
}

#[async_trait]
impl AssessmentStore for InMemoryStore {
    async fn create(&self, assessment: NewAssessment) -> Result<Assessment, AppError> {
        let mut state = self.state.lock().await;
        if state.name_taken(&assessment.set_name, None) {
            return Err(conflict(&assessment.set_name));
        }

        state.next_set_id += 1;
        let set_id = state.next_set_id;
        state.sets.insert(set_id, assessment.set_name.clone());

        let questions = assessment
            .questions
            .into_iter()
            .map(|q| state.insert_question(set_id, q))
            .collect();

        Ok(Assessment {
            set_id,
            set_name: assessment.set_name,
            questions,
        })
    }

    async fn find_by_id(&self, set_id: i64) -> Result<Option<Assessment>, AppError> {
        let state = self.state.lock().await;
        Ok(state
            .sets
            .get(&set_id)
            .map(|name| state.assemble(set_id, name)))
    }

    async fn find_by_set_name(&self, set_name: &str) -> Result<Option<Assessment>, AppError> {
        let state = self.state.lock().await;
        Ok(state
            .sets
            .iter()
            .find(|(_, name)| name.as_str() == set_name)
            .map(|(id, name)| state.assemble(*id, name)))
    }

    async fn find_all(&self) -> Result<Vec<Assessment>, AppError> {
        let state = self.state.lock().await;
        Ok(state
            .sets
            .iter()
            .map(|(id, name)| state.assemble(*id, name))
            .collect())
    }

    async fn save(&self, assessment: &Assessment) -> Result<Assessment, AppError> {
        self.assessment_saves.fetch_add(1, Ordering::SeqCst);

        let mut state = self.state.lock().await;
        if !state.sets.contains_key(&assessment.set_id) {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Assessment {} not found",
                assessment.set_id
            )));
        }
        if state.name_taken(&assessment.set_name, Some(assessment.set_id)) {
            return Err(conflict(&assessment.set_name));
        }

        state
            .sets
            .insert(assessment.set_id, assessment.set_name.clone());
        Ok(assessment.clone())
    }
}

#[async_trait]
impl QuestionStore for InMemoryStore {
    async fn find_by_id(&self, question_id: i64) -> Result<Option<Question>, AppError> {
        let state = self.state.lock().await;
        Ok(state.questions.get(&question_id).map(|(_, q)| q.clone()))
    }

    async fn add(&self, set_id: i64, question: NewQuestion) -> Result<Question, AppError> {
        let mut state = self.state.lock().await;
        if !state.sets.contains_key(&set_id) {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Assessment {} not found",
                set_id
            )));
        }
        Ok(state.insert_question(set_id, question))
    }

    async fn save(&self, question: &Question) -> Result<Question, AppError> {
        self.question_saves.fetch_add(1, Ordering::SeqCst);

        let mut state = self.state.lock().await;
        match state.questions.get_mut(&question.question_id) {
            Some((_, stored)) => {
                *stored = question.clone();
                Ok(question.clone())
            }
            None => Err(AppError::NotFound(anyhow::anyhow!(
                "Question {} not found",
                question.question_id
            ))),
        }
    }

    async fn delete_by_id(&self, question_id: i64) -> Result<(), AppError> {
        self.question_deletes.fetch_add(1, Ordering::SeqCst);
        self.state.lock().await.questions.remove(&question_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Answer;

    fn new_assessment(name: &str) -> NewAssessment {
        NewAssessment {
            set_name: name.to_string(),
            questions: vec![NewQuestion {
                question_text: "q1".to_string(),
                answers: vec![Answer::new("v1", "s1")],
            }],
        }
    }

    #[tokio::test]
    async fn duplicate_set_name_is_conflict() {
        let store = InMemoryStore::new();
        store.create(new_assessment("Java")).await.unwrap();

        let err = store.create(new_assessment("Java")).await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(AssessmentStore::find_all(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn questions_follow_their_set() {
        let store = InMemoryStore::new();
        let java = store.create(new_assessment("Java")).await.unwrap();
        let rust = store.create(new_assessment("Rust")).await.unwrap();

        store
            .add(
                java.set_id,
                NewQuestion {
                    question_text: "q2".to_string(),
                    answers: vec![],
                },
            )
            .await
            .unwrap();

        let java = AssessmentStore::find_by_id(&store, java.set_id)
            .await
            .unwrap()
            .unwrap();
        let rust = store.find_by_set_name("Rust").await.unwrap().unwrap();

        assert_eq!(java.questions.len(), 2);
        assert_eq!(java.questions[1].question_text, "q2");
        assert_eq!(rust.questions.len(), 1);
    }

    #[tokio::test]
    async fn rename_to_existing_name_is_conflict() {
        let store = InMemoryStore::new();
        store.create(new_assessment("Java")).await.unwrap();
        let mut rust = store.create(new_assessment("Rust")).await.unwrap();

        rust.set_name = "Java".to_string();
        assert!(AssessmentStore::save(&store, &rust)
            .await
            .unwrap_err()
            .is_conflict());
    }
}
