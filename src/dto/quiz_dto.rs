use crate::error::{Error, Result};
use crate::models::quiz::Quiz;
use crate::models::quiz_question::QuizQuestion;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::Validate;

fn default_limit() -> i64 {
    10
}

fn default_randomize() -> bool {
    true
}

fn default_passing_ratio() -> f64 {
    0.7
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateQuizRequest {
    #[validate(length(min = 1))]
    pub name: String,

    #[validate(length(min = 1))]
    pub topic_id: String,

    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: i64,

    #[serde(default = "default_randomize")]
    pub randomize: bool,

    pub time_limit_seconds: Option<i32>,

    #[serde(default = "default_passing_ratio")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub passing_ratio: f64,

    /// None and 0 both mean unlimited attempts.
    pub number_of_attempts: Option<i32>,
}

/// Administrative metadata update; everything else on a quiz is immutable.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateQuizRequest {
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

// Custom deserializer to trim strings and convert empty strings to None
fn trim_optional_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct QuizListQuery {
    pub user_id: Option<String>,
    pub topic_id: Option<String>,
    pub is_active: Option<bool>,

    #[validate(range(min = 1, max = 100))]
    pub min_question_count: Option<i32>,
    #[validate(range(min = 1, max = 100))]
    pub max_question_count: Option<i32>,
}

impl QuizListQuery {
    pub fn validate_range(&self) -> Result<()> {
        if let (Some(min), Some(max)) = (self.min_question_count, self.max_question_count) {
            if min >= max {
                return Err(Error::Validation(
                    "min_question_count must be less than max_question_count".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Snapshot question as shown to a quiz taker: `correct_option` and
/// `explanation` are withheld while the quiz can still be taken.
#[derive(Debug, Clone, Serialize)]
pub struct QuizQuestionPublic {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub question_id: String,
    pub name: String,
    pub question: String,
    pub options: JsonValue,
    pub order_index: i32,
}

impl From<QuizQuestion> for QuizQuestionPublic {
    fn from(q: QuizQuestion) -> Self {
        Self {
            id: q.id,
            quiz_id: q.quiz_id,
            question_id: q.question_id,
            name: q.name,
            question: q.question,
            options: q.options,
            order_index: q.order_index,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizDetailsResponse {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub questions: Vec<QuizQuestionPublic>,
}
