use axum::{
    routing::{get, post, put},
    Router,
};
use quiz_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    let app = Router::new()
        .route("/health", get(routes::health::health))
        .route(
            "/quizzes",
            get(routes::quiz::list_quizzes).post(routes::quiz::create_quiz),
        )
        .route(
            "/quizzes/:id",
            get(routes::quiz::get_quiz_details)
                .patch(routes::quiz::update_quiz)
                .delete(routes::quiz::delete_quiz),
        )
        .route("/quizzes/:id/start", post(routes::session::start_session))
        .route("/sessions", get(routes::session::list_sessions))
        .route("/sessions/:id", get(routes::session::get_session))
        .route(
            "/sessions/:id/results",
            get(routes::session::get_session_results),
        )
        .route(
            "/sessions/:id/questions/next",
            get(routes::session::next_question),
        )
        .route(
            "/sessions/:id/answers/:question_id",
            put(routes::session::submit_answer),
        )
        .route("/sessions/:id/submit", post(routes::session::submit_session))
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
