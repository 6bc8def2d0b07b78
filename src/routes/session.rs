use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::session_dto::{
        NextQuestionResponse, QuestionForClient, SessionDetails, SessionListQuery,
        SubmitAnswerRequest,
    },
    error::Result,
    middleware::identity::UserId,
    AppState,
};

#[utoipa::path(
    post,
    path = "/quizzes/{id}/start",
    params(("id" = String, Path, description = "Quiz ID")),
    responses(
        (status = 201, description = "New session created"),
        (status = 403, description = "Attempt ceiling reached"),
        (status = 404, description = "Quiz not found")
    )
)]
#[axum::debug_handler]
pub async fn start_session(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(quiz_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let session = state
        .session_service
        .start_session(quiz_id, &user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

#[utoipa::path(
    get,
    path = "/sessions",
    params(
        ("quiz_id" = Option<String>, Query, description = "Filter by quiz"),
        ("is_active" = Option<bool>, Query, description = "Filter by lifecycle state")
    ),
    responses((status = 200, description = "The caller's sessions"))
)]
#[axum::debug_handler]
pub async fn list_sessions(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Query(query): Query<SessionListQuery>,
) -> Result<impl IntoResponse> {
    let sessions = state.session_service.list_sessions(&user_id, &query).await?;
    Ok(Json(sessions))
}

#[utoipa::path(
    get,
    path = "/sessions/{id}",
    params(("id" = String, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session with its answers"),
        (status = 403, description = "Session belongs to a different user"),
        (status = 404, description = "Session not found")
    )
)]
#[axum::debug_handler]
pub async fn get_session(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let (session, answers) = state
        .session_service
        .get_session_details(session_id, &user_id)
        .await?;
    Ok(Json(SessionDetails { session, answers }))
}

#[utoipa::path(
    get,
    path = "/sessions/{id}/results",
    params(("id" = String, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Summary and per-question breakdown"),
        (status = 400, description = "Session is still in progress")
    )
)]
#[axum::debug_handler]
pub async fn get_session_results(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let results = state
        .session_service
        .get_session_results(session_id, &user_id)
        .await?;
    Ok(Json(results))
}

#[utoipa::path(
    get,
    path = "/sessions/{id}/questions/next",
    params(("id" = String, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Next question, or the end-of-sequence signal"),
        (status = 400, description = "Session already completed")
    )
)]
#[axum::debug_handler]
pub async fn next_question(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let response = match state
        .session_service
        .next_question(session_id, &user_id)
        .await?
    {
        Some(question) => NextQuestionResponse::Question(QuestionForClient::from(question)),
        None => NextQuestionResponse::finished(),
    };
    Ok(Json(response))
}

#[utoipa::path(
    put,
    path = "/sessions/{id}/answers/{question_id}",
    params(
        ("id" = String, Path, description = "Session ID"),
        ("question_id" = String, Path, description = "Snapshot question ID")
    ),
    responses(
        (status = 200, description = "Answer recorded or revised"),
        (status = 400, description = "Session already completed"),
        (status = 404, description = "Question not part of this quiz"),
        (status = 409, description = "Concurrent duplicate insert")
    )
)]
#[axum::debug_handler]
pub async fn submit_answer(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path((session_id, question_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let answer = state
        .session_service
        .submit_answer(session_id, &user_id, question_id, payload.selected_option)
        .await?;
    Ok(Json(answer))
}

#[utoipa::path(
    post,
    path = "/sessions/{id}/submit",
    params(("id" = String, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session graded and frozen"),
        (status = 400, description = "Session already completed")
    )
)]
#[axum::debug_handler]
pub async fn submit_session(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let summary = state
        .session_service
        .submit_session(session_id, &user_id)
        .await?;
    Ok(Json(summary))
}
