//! In-memory store, used when no database is configured and in tests.

use crate::models::{Email, NewEmail, NewSurvey, Survey};
use crate::services::store::{EmailStore, SurveyStore};
use async_trait::async_trait;
use service_core::error::AppError;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

#[derive(Default)]
struct State {
    next_survey_id: i64,
    next_email_id: i64,
    surveys: BTreeMap<i64, Survey>,
    emails: Vec<Email>,
}

/// Store keeping surveys and emails in process memory, with write counters.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    survey_creates: AtomicU64,
    email_batches: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `SurveyStore::create` calls.
    pub fn survey_creates(&self) -> u64 {
        self.survey_creates.load(Ordering::SeqCst)
    }

    /// Number of `EmailStore::save_all` calls.
    pub fn email_batches(&self) -> u64 {
        self.email_batches.load(Ordering::SeqCst)
    }

    /// Total number of writes of any kind.
    pub fn writes(&self) -> u64 {
        self.survey_creates() + self.email_batches()
    }
}

#[async_trait]
impl SurveyStore for InMemoryStore {
    async fn create(&self, survey: NewSurvey) -> Result<Survey, AppError> {
        self.survey_creates.fetch_add(1, Ordering::SeqCst);

        let mut state = self.state.lock().await;
        state.next_survey_id += 1;
        let survey = Survey {
            survey_id: state.next_survey_id,
            requestor: survey.requestor,
            company_name: survey.company_name,
            set_id: survey.set_id,
            start_date: survey.start_date,
            end_date: survey.end_date,
        };
        state.surveys.insert(survey.survey_id, survey.clone());
        Ok(survey)
    }

    async fn find_by_id(&self, survey_id: i64) -> Result<Option<Survey>, AppError> {
        Ok(self.state.lock().await.surveys.get(&survey_id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Survey>, AppError> {
        Ok(self.state.lock().await.surveys.values().cloned().collect())
    }
}

#[async_trait]
impl EmailStore for InMemoryStore {
    async fn save_all(&self, emails: Vec<NewEmail>) -> Result<Vec<Email>, AppError> {
        self.email_batches.fetch_add(1, Ordering::SeqCst);

        let mut state = self.state.lock().await;
        if let Some(missing) = emails
            .iter()
            .find(|e| !state.surveys.contains_key(&e.survey_id))
        {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "survey {} does not exist",
                missing.survey_id
            )));
        }

        let mut saved = Vec::with_capacity(emails.len());
        for email in emails {
            state.next_email_id += 1;
            saved.push(Email {
                id: state.next_email_id,
                email: email.email,
                survey_id: email.survey_id,
                status: email.status,
            });
        }
        state.emails.extend(saved.iter().cloned());
        Ok(saved)
    }

    async fn find_by_survey_id(&self, survey_id: i64) -> Result<Vec<Email>, AppError> {
        Ok(self
            .state
            .lock()
            .await
            .emails
            .iter()
            .filter(|e| e.survey_id == survey_id)
            .cloned()
            .collect())
    }
}
