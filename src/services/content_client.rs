use crate::error::{Error, Result};
use crate::models::quiz_question::AnswerOption;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound for any single call to the content service. No retries:
/// a failed call surfaces immediately and the caller decides what to do.
pub const CONTENT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Deserialize)]
pub struct Topic {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

/// Question as served by the content service, before snapshotting.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceQuestion {
    pub id: String,
    pub name: String,
    pub question: String,
    pub options: Vec<AnswerOption>,
    pub correct_option: i32,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionFilter {
    pub topic_id: String,
    pub limit: i64,
    pub randomize: bool,
    pub is_public: bool,
}

impl QuestionFilter {
    /// The quiz builder only ever composes from public questions.
    pub fn public_only(topic_id: &str, limit: i64, randomize: bool) -> Self {
        Self {
            topic_id: topic_id.to_string(),
            limit,
            randomize,
            is_public: true,
        }
    }
}

#[async_trait]
pub trait ContentApi: Send + Sync {
    async fn fetch_topic(&self, topic_id: &str) -> Result<Topic>;
    async fn fetch_questions(&self, filter: &QuestionFilter) -> Result<Vec<SourceQuestion>>;
}

#[derive(Clone)]
pub struct HttpContentClient {
    client: Client,
    base_url: String,
}

impl HttpContentClient {
    pub fn new(base_url: String, client: Client) -> Self {
        Self { client, base_url }
    }

    fn classify_transport_error(err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::UpstreamUnavailable("question service unavailable (timeout)".to_string())
        } else if err.is_connect() {
            Error::UpstreamUnavailable(
                "question service unavailable (connection refused)".to_string(),
            )
        } else {
            Error::UpstreamRejected(format!("error from question service: {}", err))
        }
    }
}

#[async_trait]
impl ContentApi for HttpContentClient {
    async fn fetch_topic(&self, topic_id: &str) -> Result<Topic> {
        let url = format!("{}/topics/{}", self.base_url, topic_id);
        let response = self
            .client
            .get(&url)
            .timeout(CONTENT_TIMEOUT)
            .send()
            .await
            .map_err(Self::classify_transport_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("Topic {} not found", topic_id)));
        }
        if !status.is_success() {
            return Err(Error::UpstreamRejected(format!(
                "question service returned {} for topic lookup",
                status
            )));
        }

        response
            .json::<Topic>()
            .await
            .map_err(|e| Error::UpstreamRejected(format!("malformed topic payload: {}", e)))
    }

    async fn fetch_questions(&self, filter: &QuestionFilter) -> Result<Vec<SourceQuestion>> {
        let url = format!("{}/questions/", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(filter)
            .timeout(CONTENT_TIMEOUT)
            .send()
            .await
            .map_err(Self::classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamRejected(format!(
                "question service returned {} for question listing",
                status
            )));
        }

        response
            .json::<Vec<SourceQuestion>>()
            .await
            .map_err(|e| Error::UpstreamRejected(format!("malformed question payload: {}", e)))
    }
}
