use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Quiz template. Immutable after creation except administrative metadata
/// (`name`, `is_active`); the question snapshots live in `quiz_questions`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Quiz {
    pub id: Uuid,
    pub name: String,
    pub user_id: String,
    pub topic_id: String,
    pub topic_name: String,
    pub question_count: i32,
    pub passing_ratio: f64,
    pub time_limit_seconds: Option<i32>,
    pub number_of_attempts: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Quiz {
    /// Attempt ceiling with the unlimited cases normalized away:
    /// both NULL and 0 mean "no ceiling".
    pub fn attempt_ceiling(&self) -> Option<i32> {
        self.number_of_attempts.filter(|n| *n > 0)
    }
}
