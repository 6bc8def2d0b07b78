use crate::dto::session_dto::{
    QuestionResultDetail, SessionListQuery, SessionResults, SessionSummary,
};
use crate::error::{Error, Result};
use crate::models::answer::Answer;
use crate::models::quiz::Quiz;
use crate::models::quiz_question::QuizQuestion;
use crate::models::quiz_session::QuizSession;
use crate::services::grading_service::GradingService;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

/// Answers with this attempt number are the ones the public flow writes
/// and the only ones grading reads.
const PRIMARY_ATTEMPT: i32 = 1;

#[derive(Clone)]
pub struct SessionService {
    pool: PgPool,
}

impl SessionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a new attempt at a quiz, enforcing the quiz's attempt ceiling.
    ///
    /// The ceiling check is count-then-insert: two simultaneous starts can
    /// slip past it and both succeed. The ceiling is a usage guard, not a
    /// security boundary, so that narrow race is accepted.
    pub async fn start_session(&self, quiz_id: Uuid, user_id: &str) -> Result<QuizSession> {
        let quiz = sqlx::query_as::<_, Quiz>(r#"SELECT * FROM quizzes WHERE id = $1"#)
            .bind(quiz_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Quiz not found".to_string()))?;

        let prior_attempts: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM quiz_sessions WHERE quiz_id = $1 AND user_id = $2"#,
        )
        .bind(quiz_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        if let Some(ceiling) = quiz.attempt_ceiling() {
            if prior_attempts >= ceiling as i64 {
                return Err(Error::Forbidden(format!(
                    "Attempt limit of {} reached for this quiz",
                    ceiling
                )));
            }
        }

        let session = sqlx::query_as::<_, QuizSession>(
            r#"
            INSERT INTO quiz_sessions (
                quiz_id, user_id, question_count, time_limit_seconds, attempt_number
            ) VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(quiz_id)
        .bind(user_id)
        .bind(quiz.question_count)
        .bind(quiz.time_limit_seconds)
        .bind(prior_attempts as i32 + 1)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            session_id = %session.id,
            quiz_id = %quiz_id,
            attempt_number = session.attempt_number,
            "session started"
        );

        Ok(session)
    }

    /// A session is only ever visible to the user it belongs to. This guard
    /// is the sole authorization mechanism; every mutating operation goes
    /// through it.
    pub async fn get_session(&self, session_id: Uuid, user_id: &str) -> Result<QuizSession> {
        let session =
            sqlx::query_as::<_, QuizSession>(r#"SELECT * FROM quiz_sessions WHERE id = $1"#)
                .bind(session_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| Error::NotFound("Session not found".to_string()))?;

        if session.user_id != user_id {
            return Err(Error::Forbidden(
                "Session belongs to a different user".to_string(),
            ));
        }

        Ok(session)
    }

    pub async fn get_active_session(&self, session_id: Uuid, user_id: &str) -> Result<QuizSession> {
        let session = self.get_session(session_id, user_id).await?;
        if !session.is_active {
            return Err(Error::InvalidState(
                "Session has already been completed".to_string(),
            ));
        }
        Ok(session)
    }

    pub async fn get_session_details(
        &self,
        session_id: Uuid,
        user_id: &str,
    ) -> Result<(QuizSession, Vec<Answer>)> {
        let session = self.get_session(session_id, user_id).await?;
        let answers = sqlx::query_as::<_, Answer>(
            r#"SELECT * FROM answers WHERE quiz_session_id = $1 ORDER BY answered_at"#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;
        Ok((session, answers))
    }

    pub async fn list_sessions(
        &self,
        user_id: &str,
        query: &SessionListQuery,
    ) -> Result<Vec<QuizSession>> {
        let sessions = sqlx::query_as::<_, QuizSession>(
            r#"
            SELECT * FROM quiz_sessions
            WHERE user_id = $1
              AND ($2::uuid IS NULL OR quiz_id = $2)
              AND ($3::bool IS NULL OR is_active = $3)
            ORDER BY started_at DESC
            "#,
        )
        .bind(user_id)
        .bind(query.quiz_id)
        .bind(query.is_active)
        .fetch_all(&self.pool)
        .await?;

        Ok(sessions)
    }

    /// The snapshot at the progression cursor, or None once the cursor has
    /// walked off the end of the quiz.
    pub async fn next_question(
        &self,
        session_id: Uuid,
        user_id: &str,
    ) -> Result<Option<QuizQuestion>> {
        let session = self.get_active_session(session_id, user_id).await?;

        if session.question_progress_index >= session.question_count {
            return Ok(None);
        }

        let question = sqlx::query_as::<_, QuizQuestion>(
            r#"SELECT * FROM quiz_questions WHERE quiz_id = $1 AND order_index = $2"#,
        )
        .bind(session.quiz_id)
        .bind(session.question_progress_index)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Question not found".to_string()))?;

        Ok(Some(question))
    }

    /// Record or revise the user's selection for one question, then advance
    /// the progression cursor.
    ///
    /// A repeated submission for the same question updates the existing row
    /// in place and bumps `revision_count`; a concurrent duplicate first
    /// insert trips the uniqueness constraint and surfaces as a conflict.
    pub async fn submit_answer(
        &self,
        session_id: Uuid,
        user_id: &str,
        question_id: Uuid,
        selected_option: i32,
    ) -> Result<Answer> {
        let session = self.get_active_session(session_id, user_id).await?;

        let mut tx = self.pool.begin().await?;

        // The question must be one of this quiz's snapshots.
        sqlx::query_as::<_, QuizQuestion>(
            r#"SELECT * FROM quiz_questions WHERE id = $1 AND quiz_id = $2"#,
        )
        .bind(question_id)
        .bind(session.quiz_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound("Question not found in this quiz".to_string()))?;

        let existing = sqlx::query_as::<_, Answer>(
            r#"
            SELECT * FROM answers
            WHERE quiz_session_id = $1 AND quiz_question_id = $2 AND attempt_number = $3
            "#,
        )
        .bind(session_id)
        .bind(question_id)
        .bind(PRIMARY_ATTEMPT)
        .fetch_optional(&mut *tx)
        .await?;

        let answer = match existing {
            Some(previous) => {
                sqlx::query_as::<_, Answer>(
                    r#"
                    UPDATE answers
                    SET selected_option = $1,
                        revision_count = revision_count + 1,
                        updated_at = NOW()
                    WHERE id = $2
                    RETURNING *
                    "#,
                )
                .bind(selected_option)
                .bind(previous.id)
                .fetch_one(&mut *tx)
                .await?
            }
            None => {
                sqlx::query_as::<_, Answer>(
                    r#"
                    INSERT INTO answers (
                        quiz_session_id, quiz_question_id, selected_option, attempt_number
                    ) VALUES ($1, $2, $3, $4)
                    RETURNING *
                    "#,
                )
                .bind(session_id)
                .bind(question_id)
                .bind(selected_option)
                .bind(PRIMARY_ATTEMPT)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        // Monotonic cursor: one step forward, capped at question_count,
        // never decremented.
        sqlx::query(
            r#"
            UPDATE quiz_sessions
            SET question_progress_index = LEAST(question_progress_index + 1, question_count)
            WHERE id = $1
            "#,
        )
        .bind(session_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(answer)
    }

    /// Grade the session and freeze it. Runs once: a second submission is
    /// rejected by the active-session guard.
    pub async fn submit_session(&self, session_id: Uuid, user_id: &str) -> Result<SessionSummary> {
        let session = self.get_active_session(session_id, user_id).await?;

        let quiz = sqlx::query_as::<_, Quiz>(r#"SELECT * FROM quizzes WHERE id = $1"#)
            .bind(session.quiz_id)
            .fetch_one(&self.pool)
            .await?;

        let mut tx = self.pool.begin().await?;

        let questions = sqlx::query_as::<_, QuizQuestion>(
            r#"SELECT * FROM quiz_questions WHERE quiz_id = $1 ORDER BY order_index"#,
        )
        .bind(session.quiz_id)
        .fetch_all(&mut *tx)
        .await?;

        let answers = sqlx::query_as::<_, Answer>(
            r#"SELECT * FROM answers WHERE quiz_session_id = $1 AND attempt_number = $2"#,
        )
        .bind(session_id)
        .bind(PRIMARY_ATTEMPT)
        .fetch_all(&mut *tx)
        .await?;

        let outcome = GradingService::grade(&questions, &answers);

        for verdict in &outcome.graded {
            sqlx::query(
                r#"UPDATE answers SET is_correct = $1, graded_at = NOW() WHERE id = $2"#,
            )
            .bind(verdict.is_correct)
            .bind(verdict.answer_id)
            .execute(&mut *tx)
            .await?;
        }

        let graded = sqlx::query_as::<_, QuizSession>(
            r#"
            UPDATE quiz_sessions
            SET score = $1,
                wrong_answers = $2,
                unanswered_questions = $3,
                is_active = FALSE,
                completed_at = NOW(),
                completion_details = 'completed'
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(outcome.score)
        .bind(outcome.wrong_answers)
        .bind(outcome.unanswered_questions)
        .bind(session_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            session_id = %session_id,
            score = outcome.score,
            wrong = outcome.wrong_answers,
            unanswered = outcome.unanswered_questions,
            "session graded"
        );

        Ok(Self::summarize(&graded, quiz.passing_ratio))
    }

    /// Summary plus the per-question breakdown, available once terminal.
    pub async fn get_session_results(
        &self,
        session_id: Uuid,
        user_id: &str,
    ) -> Result<SessionResults> {
        let session = self.get_session(session_id, user_id).await?;
        if session.is_active {
            return Err(Error::InvalidState(
                "Session has not been submitted yet".to_string(),
            ));
        }

        let quiz = sqlx::query_as::<_, Quiz>(r#"SELECT * FROM quizzes WHERE id = $1"#)
            .bind(session.quiz_id)
            .fetch_one(&self.pool)
            .await?;

        let questions = sqlx::query_as::<_, QuizQuestion>(
            r#"SELECT * FROM quiz_questions WHERE quiz_id = $1 ORDER BY order_index"#,
        )
        .bind(session.quiz_id)
        .fetch_all(&self.pool)
        .await?;

        let answers = sqlx::query_as::<_, Answer>(
            r#"SELECT * FROM answers WHERE quiz_session_id = $1 AND attempt_number = $2"#,
        )
        .bind(session_id)
        .bind(PRIMARY_ATTEMPT)
        .fetch_all(&self.pool)
        .await?;

        let by_question: HashMap<Uuid, &Answer> = answers
            .iter()
            .map(|a| (a.quiz_question_id, a))
            .collect();

        let breakdown = questions
            .into_iter()
            .map(|question| {
                let answer = by_question.get(&question.id);
                QuestionResultDetail {
                    question_id: question.id,
                    question_text: question.question,
                    user_answer: answer.map(|a| a.selected_option),
                    correct_answer: question.correct_option,
                    is_correct: answer.and_then(|a| a.is_correct),
                    is_answered: answer.is_some(),
                }
            })
            .collect();

        Ok(SessionResults {
            summary: Self::summarize(&session, quiz.passing_ratio),
            questions: breakdown,
        })
    }

    fn summarize(session: &QuizSession, passing_ratio: f64) -> SessionSummary {
        SessionSummary {
            id: session.id,
            quiz_id: session.quiz_id,
            score: session.score,
            question_count: session.question_count,
            score_percentage: GradingService::score_percentage(
                session.score,
                session.question_count,
            ),
            wrong_answers: session.wrong_answers,
            unanswered_questions: session.unanswered_questions,
            time_taken_seconds: session.time_taken_seconds(),
            completed_at: session.completed_at,
            completion_details: session.completion_details.clone(),
            passed: GradingService::passed(
                session.score,
                session.question_count,
                passing_ratio,
            ),
        }
    }
}
