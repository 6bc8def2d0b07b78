use crate::models::answer::Answer;
use crate::models::quiz_question::QuizQuestion;
use crate::models::quiz_session::QuizSession;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionListQuery {
    pub quiz_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

/// Question shape served during an active session: no correct option,
/// no explanation.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionForClient {
    pub id: Uuid,
    pub question: String,
    pub options: JsonValue,
    pub order_index: i32,
}

impl From<QuizQuestion> for QuestionForClient {
    fn from(q: QuizQuestion) -> Self {
        Self {
            id: q.id,
            question: q.question,
            options: q.options,
            order_index: q.order_index,
        }
    }
}

/// Either the next question in sequence or the end-of-sequence signal.
/// Running out of questions is a normal condition, not an error.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum NextQuestionResponse {
    Question(QuestionForClient),
    Finished { finished: bool, message: String },
}

impl NextQuestionResponse {
    pub fn finished() -> Self {
        Self::Finished {
            finished: true,
            message: "No more questions".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SubmitAnswerRequest {
    #[validate(range(min = 0))]
    pub selected_option: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub score: i32,
    pub question_count: i32,
    pub score_percentage: f64,
    pub wrong_answers: i32,
    pub unanswered_questions: i32,
    pub time_taken_seconds: Option<i64>,
    pub completed_at: Option<DateTime<Utc>>,
    pub completion_details: Option<String>,
    pub passed: bool,
}

/// Per-question breakdown for a completed session. Correct answers are
/// revealed here, once the session is terminal.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionResultDetail {
    pub question_id: Uuid,
    pub question_text: String,
    pub user_answer: Option<i32>,
    pub correct_answer: i32,
    pub is_correct: Option<bool>,
    pub is_answered: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionResults {
    #[serde(flatten)]
    pub summary: SessionSummary,
    pub questions: Vec<QuestionResultDetail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionDetails {
    #[serde(flatten)]
    pub session: QuizSession,
    pub answers: Vec<Answer>,
}
