pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use crate::services::content_client::{ContentApi, HttpContentClient, CONTENT_TIMEOUT};
use crate::services::quiz_service::QuizService;
use crate::services::session_service::SessionService;
use reqwest::Client;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub quiz_service: QuizService,
    pub session_service: SessionService,
}

impl AppState {
    /// Wire the state against the real content service from configuration.
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(CONTENT_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");

        let content: Arc<dyn ContentApi> = Arc::new(HttpContentClient::new(
            config.content_service_base_url.clone(),
            http_client,
        ));

        Self::with_content(pool, content)
    }

    /// Explicit wiring seam: tests inject a mocked content service here.
    pub fn with_content(pool: PgPool, content: Arc<dyn ContentApi>) -> Self {
        let quiz_service = QuizService::new(pool.clone(), content);
        let session_service = SessionService::new(pool.clone());

        Self {
            pool,
            quiz_service,
            session_service,
        }
    }
}
