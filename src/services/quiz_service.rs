use crate::dto::quiz_dto::{CreateQuizRequest, QuizListQuery, UpdateQuizRequest};
use crate::error::{Error, Result};
use crate::models::quiz::Quiz;
use crate::models::quiz_question::QuizQuestion;
use crate::services::content_client::{ContentApi, QuestionFilter};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct QuizService {
    pool: PgPool,
    content: Arc<dyn ContentApi>,
}

/// The attempt ceiling treats 0 and absent as the same thing: unlimited.
pub fn normalize_attempt_limit(number_of_attempts: Option<i32>) -> Option<i32> {
    number_of_attempts.filter(|n| *n > 0)
}

impl QuizService {
    pub fn new(pool: PgPool, content: Arc<dyn ContentApi>) -> Self {
        Self { pool, content }
    }

    /// Compose a quiz from the content service.
    ///
    /// Resolves the topic (its name is denormalized onto the quiz), fetches
    /// matching public questions, and persists the quiz together with one
    /// snapshot row per question in a single transaction. A quiz is never
    /// persisted without its snapshots.
    pub async fn create_quiz(&self, user_id: &str, request: CreateQuizRequest) -> Result<Quiz> {
        let topic = self.content.fetch_topic(&request.topic_id).await?;

        let filter = QuestionFilter::public_only(&request.topic_id, request.limit, request.randomize);
        let questions = self.content.fetch_questions(&filter).await?;

        if questions.is_empty() {
            return Err(Error::QuestionsNotFound {
                topic_id: request.topic_id,
                requested: request.limit,
            });
        }

        let number_of_attempts = normalize_attempt_limit(request.number_of_attempts);
        let question_count = questions.len() as i32;

        let mut tx = self.pool.begin().await?;

        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            INSERT INTO quizzes (
                name, user_id, topic_id, topic_name, question_count,
                passing_ratio, time_limit_seconds, number_of_attempts
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(user_id)
        .bind(&request.topic_id)
        .bind(&topic.name)
        .bind(question_count)
        .bind(request.passing_ratio)
        .bind(request.time_limit_seconds)
        .bind(number_of_attempts)
        .fetch_one(&mut *tx)
        .await?;

        // Snapshot order is whatever the content service returned,
        // randomized or not.
        for (idx, question) in questions.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO quiz_questions (
                    quiz_id, question_id, name, question, options,
                    correct_option, explanation, order_index
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(quiz.id)
            .bind(&question.id)
            .bind(&question.name)
            .bind(&question.question)
            .bind(serde_json::to_value(&question.options)?)
            .bind(question.correct_option)
            .bind(&question.explanation)
            .bind(idx as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            quiz_id = %quiz.id,
            topic_id = %quiz.topic_id,
            question_count,
            "quiz created"
        );

        Ok(quiz)
    }

    pub async fn list_quizzes(&self, query: &QuizListQuery) -> Result<Vec<Quiz>> {
        query.validate_range()?;

        let quizzes = sqlx::query_as::<_, Quiz>(
            r#"
            SELECT * FROM quizzes
            WHERE ($1::text IS NULL OR user_id = $1)
              AND ($2::text IS NULL OR topic_id = $2)
              AND ($3::bool IS NULL OR is_active = $3)
              AND ($4::int IS NULL OR question_count >= $4)
              AND ($5::int IS NULL OR question_count <= $5)
            ORDER BY created_at DESC
            "#,
        )
        .bind(&query.user_id)
        .bind(&query.topic_id)
        .bind(query.is_active)
        .bind(query.min_question_count)
        .bind(query.max_question_count)
        .fetch_all(&self.pool)
        .await?;

        Ok(quizzes)
    }

    pub async fn get_quiz(&self, quiz_id: Uuid) -> Result<Quiz> {
        let quiz = sqlx::query_as::<_, Quiz>(r#"SELECT * FROM quizzes WHERE id = $1"#)
            .bind(quiz_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Quiz not found".to_string()))?;
        Ok(quiz)
    }

    pub async fn get_quiz_details(&self, quiz_id: Uuid) -> Result<(Quiz, Vec<QuizQuestion>)> {
        let quiz = self.get_quiz(quiz_id).await?;
        let questions = sqlx::query_as::<_, QuizQuestion>(
            r#"SELECT * FROM quiz_questions WHERE quiz_id = $1 ORDER BY order_index"#,
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;
        Ok((quiz, questions))
    }

    /// Administrative metadata only; the snapshot set and configuration are
    /// immutable after creation.
    pub async fn update_quiz(&self, quiz_id: Uuid, payload: UpdateQuizRequest) -> Result<Quiz> {
        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            UPDATE quizzes
            SET name = COALESCE($1, name),
                is_active = COALESCE($2, is_active),
                updated_at = NOW()
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(payload.name)
        .bind(payload.is_active)
        .bind(quiz_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Quiz not found".to_string()))?;

        Ok(quiz)
    }

    /// Referential guard: a quiz that sessions point at may not be removed.
    /// Without sessions the quiz and its snapshots go together.
    pub async fn delete_quiz(&self, quiz_id: Uuid) -> Result<()> {
        self.get_quiz(quiz_id).await?;

        let session_count: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM quiz_sessions WHERE quiz_id = $1"#,
        )
        .bind(quiz_id)
        .fetch_one(&self.pool)
        .await?;

        if session_count > 0 {
            return Err(Error::Conflict(format!(
                "Quiz has {} session(s) and cannot be deleted",
                session_count
            )));
        }

        sqlx::query(r#"DELETE FROM quizzes WHERE id = $1"#)
            .bind(quiz_id)
            .execute(&self.pool)
            .await?;

        tracing::info!(quiz_id = %quiz_id, "quiz deleted");
        Ok(())
    }
}
