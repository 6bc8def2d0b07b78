use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One user's attempt at taking a quiz.
///
/// Invariants: `question_progress_index` stays within
/// `[0, question_count]`, and `is_active == false` exactly when
/// `completed_at` is set.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizSession {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub user_id: String,
    pub question_count: i32,
    pub time_limit_seconds: Option<i32>,
    pub attempt_number: i32,
    pub question_progress_index: i32,
    pub score: i32,
    pub wrong_answers: i32,
    pub unanswered_questions: i32,
    pub is_active: bool,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub completion_details: Option<String>,
}

impl QuizSession {
    pub fn time_taken_seconds(&self) -> Option<i64> {
        self.completed_at
            .map(|completed| (completed - self.started_at).num_seconds())
    }
}
