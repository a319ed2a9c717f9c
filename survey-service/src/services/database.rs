//! PostgreSQL store for survey-service.

use crate::models::{Email, EmailStatus, NewEmail, NewSurvey, Survey};
use crate::services::metrics::DB_QUERY_DURATION;
use crate::services::store::{EmailStore, SurveyStore};
use async_trait::async_trait;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use std::time::Duration;
use tracing::{info, instrument};

#[derive(Debug, FromRow)]
struct EmailRow {
    id: i64,
    email: String,
    survey_id: i64,
    status: String,
}

impl TryFrom<EmailRow> for Email {
    type Error = AppError;

    fn try_from(row: EmailRow) -> Result<Self, Self::Error> {
        let status: EmailStatus = row
            .status
            .parse()
            .map_err(|e: String| AppError::DatabaseError(anyhow::anyhow!(e)))?;

        Ok(Email {
            id: row.id,
            email: row.email,
            survey_id: row.survey_id,
            status,
        })
    }
}

fn db_error(context: &str, e: sqlx::Error) -> AppError {
    AppError::DatabaseError(anyhow::anyhow!("{}: {}", context, e))
}

/// Database connection pool wrapper implementing both survey stores.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "survey-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["health_check"])
            .start_timer();

        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Health check failed", e))?;

        timer.observe_duration();
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }
}

#[async_trait]
impl SurveyStore for PgStore {
    #[instrument(skip(self, survey), fields(set_id = survey.set_id))]
    async fn create(&self, survey: NewSurvey) -> Result<Survey, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_survey"])
            .start_timer();

        let survey = sqlx::query_as::<_, Survey>(
            r#"
            INSERT INTO surveys (requestor, company_name, set_id, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING survey_id, requestor, company_name, set_id, start_date, end_date
            "#,
        )
        .bind(&survey.requestor)
        .bind(&survey.company_name)
        .bind(survey.set_id)
        .bind(survey.start_date)
        .bind(survey.end_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to create survey", e))?;

        timer.observe_duration();
        info!(survey_id = survey.survey_id, "Survey created");

        Ok(survey)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, survey_id: i64) -> Result<Option<Survey>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["find_survey_by_id"])
            .start_timer();

        let survey = sqlx::query_as::<_, Survey>(
            r#"
            SELECT survey_id, requestor, company_name, set_id, start_date, end_date
            FROM surveys
            WHERE survey_id = $1
            "#,
        )
        .bind(survey_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to get survey", e))?;

        timer.observe_duration();
        Ok(survey)
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<Survey>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_surveys"])
            .start_timer();

        let surveys = sqlx::query_as::<_, Survey>(
            r#"
            SELECT survey_id, requestor, company_name, set_id, start_date, end_date
            FROM surveys
            ORDER BY survey_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list surveys", e))?;

        timer.observe_duration();
        Ok(surveys)
    }
}

#[async_trait]
impl EmailStore for PgStore {
    #[instrument(skip(self, emails), fields(count = emails.len()))]
    async fn save_all(&self, emails: Vec<NewEmail>) -> Result<Vec<Email>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["save_emails"])
            .start_timer();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let mut saved = Vec::with_capacity(emails.len());
        for email in emails {
            let row = sqlx::query_as::<_, EmailRow>(
                r#"
                INSERT INTO emails (email, survey_id, status)
                VALUES ($1, $2, $3)
                RETURNING id, email, survey_id, status
                "#,
            )
            .bind(&email.email)
            .bind(email.survey_id)
            .bind(email.status.as_str())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to insert email", e))?;

            saved.push(Email::try_from(row)?);
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))?;

        timer.observe_duration();
        info!(count = saved.len(), "Emails saved");
        Ok(saved)
    }

    #[instrument(skip(self))]
    async fn find_by_survey_id(&self, survey_id: i64) -> Result<Vec<Email>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["find_emails_by_survey"])
            .start_timer();

        let rows = sqlx::query_as::<_, EmailRow>(
            r#"
            SELECT id, email, survey_id, status
            FROM emails
            WHERE survey_id = $1
            ORDER BY id
            "#,
        )
        .bind(survey_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to get emails", e))?;

        timer.observe_duration();
        rows.into_iter().map(Email::try_from).collect()
    }
}
