//! PostgreSQL store for assessment-service.

use crate::models::{Answer, Assessment, NewAssessment, NewQuestion, Question};
use crate::services::metrics::DB_QUERY_DURATION;
use crate::services::store::{AssessmentStore, QuestionStore};
use async_trait::async_trait;
use service_core::error::AppError;
use sqlx::postgres::{PgConnection, PgPool, PgPoolOptions};
use sqlx::FromRow;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, instrument};

#[derive(Debug, FromRow)]
struct AssessmentRow {
    set_id: i64,
    set_name: String,
}

#[derive(Debug, FromRow)]
struct QuestionRow {
    question_id: i64,
    set_id: i64,
    question_text: String,
}

#[derive(Debug, FromRow)]
struct AnswerRow {
    question_id: i64,
    value: String,
    suggestion: String,
}

fn db_error(context: &str, e: sqlx::Error) -> AppError {
    AppError::DatabaseError(anyhow::anyhow!("{}: {}", context, e))
}

/// Database connection pool wrapper implementing both assessment stores.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "assessment-service"))]
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

    /// Questions (with answers) of the given sets, keyed by set id, ordered by question id.
    async fn load_questions(&self, set_ids: &[i64]) -> Result<HashMap<i64, Vec<Question>>, AppError> {
        let rows = sqlx::query_as::<_, QuestionRow>(
            r#"
            SELECT question_id, set_id, question_text
            FROM questions
            WHERE set_id = ANY($1)
            ORDER BY question_id
            "#,
        )
        .bind(set_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load questions", e))?;

        let question_ids: Vec<i64> = rows.iter().map(|r| r.question_id).collect();
        let mut answers = self.load_answers(&question_ids).await?;

        let mut by_set: HashMap<i64, Vec<Question>> = HashMap::new();
        for row in rows {
            by_set.entry(row.set_id).or_default().push(Question {
                question_id: row.question_id,
                question_text: row.question_text,
                answers: answers.remove(&row.question_id).unwrap_or_default(),
            });
        }

        Ok(by_set)
    }

    async fn load_answers(&self, question_ids: &[i64]) -> Result<HashMap<i64, Vec<Answer>>, AppError> {
        if question_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, AnswerRow>(
            r#"
            SELECT question_id, value, suggestion
            FROM answers
            WHERE question_id = ANY($1)
            ORDER BY question_id, position
            "#,
        )
        .bind(question_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load answers", e))?;

        let mut by_question: HashMap<i64, Vec<Answer>> = HashMap::new();
        for row in rows {
            by_question.entry(row.question_id).or_default().push(Answer {
                value: row.value,
                suggestion: row.suggestion,
            });
        }

        Ok(by_question)
    }

    async fn assemble(&self, rows: Vec<AssessmentRow>) -> Result<Vec<Assessment>, AppError> {
        let set_ids: Vec<i64> = rows.iter().map(|r| r.set_id).collect();
        let mut questions = self.load_questions(&set_ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| Assessment {
                set_id: row.set_id,
                set_name: row.set_name,
                questions: questions.remove(&row.set_id).unwrap_or_default(),
            })
            .collect())
    }

    async fn find_one(&self, row: Option<AssessmentRow>) -> Result<Option<Assessment>, AppError> {
        match row {
            Some(row) => Ok(self.assemble(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }
}

async fn insert_question(
    conn: &mut PgConnection,
    set_id: i64,
    question: NewQuestion,
) -> Result<Question, AppError> {
    let question_id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO questions (set_id, question_text)
        VALUES ($1, $2)
        RETURNING question_id
        "#,
    )
    .bind(set_id)
    .bind(&question.question_text)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to insert question", e))?;

    insert_answers(conn, question_id, &question.answers).await?;

    Ok(Question {
        question_id,
        question_text: question.question_text,
        answers: question.answers,
    })
}

async fn insert_answers(
    conn: &mut PgConnection,
    question_id: i64,
    answers: &[Answer],
) -> Result<(), AppError> {
    for (position, answer) in answers.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO answers (question_id, position, value, suggestion)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(question_id)
        .bind(position as i32)
        .bind(&answer.value)
        .bind(&answer.suggestion)
        .execute(&mut *conn)
        .await
        .map_err(|e| db_error("Failed to insert answer", e))?;
    }
    Ok(())
}

#[async_trait]
impl AssessmentStore for PgStore {
    #[instrument(skip(self, assessment), fields(set_name = %assessment.set_name))]
    async fn create(&self, assessment: NewAssessment) -> Result<Assessment, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_assessment"])
            .start_timer();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        // Unique violations surface as AppError::Conflict.
        let set_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO assessments (set_name) VALUES ($1) RETURNING set_id",
        )
        .bind(&assessment.set_name)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::from)?;

        let mut questions = Vec::with_capacity(assessment.questions.len());
        for question in assessment.questions {
            questions.push(insert_question(&mut tx, set_id, question).await?);
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))?;

        timer.observe_duration();
        info!(set_id = set_id, questions = questions.len(), "Assessment created");

        Ok(Assessment {
            set_id,
            set_name: assessment.set_name,
            questions,
        })
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, set_id: i64) -> Result<Option<Assessment>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["find_assessment_by_id"])
            .start_timer();

        let row = sqlx::query_as::<_, AssessmentRow>(
            "SELECT set_id, set_name FROM assessments WHERE set_id = $1",
        )
        .bind(set_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to get assessment", e))?;

        let assessment = self.find_one(row).await?;
        timer.observe_duration();
        Ok(assessment)
    }

    #[instrument(skip(self))]
    async fn find_by_set_name(&self, set_name: &str) -> Result<Option<Assessment>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["find_assessment_by_name"])
            .start_timer();

        let row = sqlx::query_as::<_, AssessmentRow>(
            "SELECT set_id, set_name FROM assessments WHERE set_name = $1",
        )
        .bind(set_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to get assessment", e))?;

        let assessment = self.find_one(row).await?;
        timer.observe_duration();
        Ok(assessment)
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<Assessment>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_assessments"])
            .start_timer();

        let rows = sqlx::query_as::<_, AssessmentRow>(
            "SELECT set_id, set_name FROM assessments ORDER BY set_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list assessments", e))?;

        let assessments = self.assemble(rows).await?;
        timer.observe_duration();
        Ok(assessments)
    }

    #[instrument(skip(self, assessment), fields(set_id = assessment.set_id))]
    async fn save(&self, assessment: &Assessment) -> Result<Assessment, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["save_assessment"])
            .start_timer();

        let result = sqlx::query(
            r#"
            UPDATE assessments
            SET set_name = $2, updated_utc = NOW()
            WHERE set_id = $1
            "#,
        )
        .bind(assessment.set_id)
        .bind(&assessment.set_name)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Assessment {} not found",
                assessment.set_id
            )));
        }

        timer.observe_duration();
        Ok(assessment.clone())
    }
}

#[async_trait]
impl QuestionStore for PgStore {
    #[instrument(skip(self))]
    async fn find_by_id(&self, question_id: i64) -> Result<Option<Question>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["find_question_by_id"])
            .start_timer();

        let row = sqlx::query_as::<_, QuestionRow>(
            "SELECT question_id, set_id, question_text FROM questions WHERE question_id = $1",
        )
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to get question", e))?;

        let question = match row {
            Some(row) => {
                let mut answers = self.load_answers(&[row.question_id]).await?;
                Some(Question {
                    question_id: row.question_id,
                    question_text: row.question_text,
                    answers: answers.remove(&row.question_id).unwrap_or_default(),
                })
            }
            None => None,
        };

        timer.observe_duration();
        Ok(question)
    }

    #[instrument(skip(self, question))]
    async fn add(&self, set_id: i64, question: NewQuestion) -> Result<Question, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["add_question"])
            .start_timer();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let question = insert_question(&mut tx, set_id, question).await?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))?;

        timer.observe_duration();
        info!(question_id = question.question_id, "Question added");
        Ok(question)
    }

    #[instrument(skip(self, question), fields(question_id = question.question_id))]
    async fn save(&self, question: &Question) -> Result<Question, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["save_question"])
            .start_timer();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let result = sqlx::query("UPDATE questions SET question_text = $2 WHERE question_id = $1")
            .bind(question.question_id)
            .bind(&question.question_text)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to update question", e))?;

        if result.rows_affected() == 0 {
            tx.rollback().await.ok();
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Question {} not found",
                question.question_id
            )));
        }

        sqlx::query("DELETE FROM answers WHERE question_id = $1")
            .bind(question.question_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to clear answers", e))?;

        insert_answers(&mut tx, question.question_id, &question.answers).await?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))?;

        timer.observe_duration();
        Ok(question.clone())
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, question_id: i64) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_question"])
            .start_timer();

        // answers go with the question (ON DELETE CASCADE)
        sqlx::query("DELETE FROM questions WHERE question_id = $1")
            .bind(question_id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete question", e))?;

        timer.observe_duration();
        info!(question_id = question_id, "Question deleted");
        Ok(())
    }
}
