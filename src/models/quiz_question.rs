use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// One answer option of a multiple-choice question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerOption {
    pub num: i32,
    pub text: String,
}

/// Snapshot of a content-service question, copied at quiz creation time.
/// Never re-fetched: edits or deletions on the content side do not affect
/// a quiz that is already in progress.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizQuestion {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub question_id: String,
    pub name: String,
    pub question: String,
    pub options: JsonValue,
    pub correct_option: i32,
    pub explanation: String,
    pub order_index: i32,
}
