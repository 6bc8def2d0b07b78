use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::quiz_dto::{
        CreateQuizRequest, QuizDetailsResponse, QuizListQuery, QuizQuestionPublic,
        UpdateQuizRequest,
    },
    error::Result,
    middleware::identity::UserId,
    AppState,
};

#[utoipa::path(
    post,
    path = "/quizzes",
    responses(
        (status = 201, description = "Quiz created from content-service questions"),
        (status = 404, description = "Topic missing or no questions matched the filters"),
        (status = 502, description = "Content service rejected the request"),
        (status = 503, description = "Content service unreachable")
    )
)]
#[axum::debug_handler]
pub async fn create_quiz(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let quiz = state.quiz_service.create_quiz(&user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(quiz)))
}

#[utoipa::path(
    get,
    path = "/quizzes",
    params(
        ("user_id" = Option<String>, Query, description = "Filter by owning user"),
        ("topic_id" = Option<String>, Query, description = "Filter by topic"),
        ("is_active" = Option<bool>, Query, description = "Filter by administrative flag"),
        ("min_question_count" = Option<i32>, Query, description = "Lower bound on question count"),
        ("max_question_count" = Option<i32>, Query, description = "Upper bound on question count")
    ),
    responses(
        (status = 200, description = "List of quizzes"),
        (status = 422, description = "Invalid filter range")
    )
)]
#[axum::debug_handler]
pub async fn list_quizzes(
    State(state): State<AppState>,
    Query(query): Query<QuizListQuery>,
) -> Result<impl IntoResponse> {
    query.validate()?;
    let quizzes = state.quiz_service.list_quizzes(&query).await?;
    Ok(Json(quizzes))
}

#[utoipa::path(
    get,
    path = "/quizzes/{id}",
    params(("id" = String, Path, description = "Quiz ID")),
    responses(
        (status = 200, description = "Quiz with its snapshot questions"),
        (status = 404, description = "Quiz not found")
    )
)]
#[axum::debug_handler]
pub async fn get_quiz_details(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let (quiz, questions) = state.quiz_service.get_quiz_details(id).await?;
    let response = QuizDetailsResponse {
        quiz,
        questions: questions.into_iter().map(QuizQuestionPublic::from).collect(),
    };
    Ok(Json(response))
}

#[utoipa::path(
    patch,
    path = "/quizzes/{id}",
    params(("id" = String, Path, description = "Quiz ID")),
    responses(
        (status = 200, description = "Quiz metadata updated"),
        (status = 404, description = "Quiz not found")
    )
)]
#[axum::debug_handler]
pub async fn update_quiz(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateQuizRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let quiz = state.quiz_service.update_quiz(id, payload).await?;
    Ok(Json(quiz))
}

#[utoipa::path(
    delete,
    path = "/quizzes/{id}",
    params(("id" = String, Path, description = "Quiz ID")),
    responses(
        (status = 204, description = "Quiz and snapshots deleted"),
        (status = 404, description = "Quiz not found"),
        (status = 409, description = "Quiz still has sessions")
    )
)]
#[axum::debug_handler]
pub async fn delete_quiz(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.quiz_service.delete_quiz(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
