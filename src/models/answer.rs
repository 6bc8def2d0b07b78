use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A user's selected option for one snapshot question within a session.
///
/// At most one row per (session, question, attempt_number) -- enforced by
/// a uniqueness constraint. Re-answering before submission updates the row
/// in place and bumps `revision_count`; `attempt_number` is reserved for a
/// future re-attempt flow and stays at 1 through the public API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Answer {
    pub id: Uuid,
    pub quiz_session_id: Uuid,
    pub quiz_question_id: Uuid,
    pub selected_option: i32,
    pub is_correct: Option<bool>,
    pub answered_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub graded_at: Option<DateTime<Utc>>,
    pub revision_count: i32,
    pub attempt_number: i32,
}
