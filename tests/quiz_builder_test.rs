use std::env;
use std::sync::Arc;

use quiz_backend::dto::quiz_dto::{CreateQuizRequest, QuizListQuery, UpdateQuizRequest};
use quiz_backend::error::Error;
use quiz_backend::models::quiz_question::AnswerOption;
use quiz_backend::services::content_client::{ContentApi, QuestionFilter, SourceQuestion, Topic};
use quiz_backend::services::quiz_service::QuizService;
use quiz_backend::services::session_service::SessionService;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

mockall::mock! {
    pub ContentService {}

    #[async_trait::async_trait]
    impl ContentApi for ContentService {
        async fn fetch_topic(&self, topic_id: &str) -> quiz_backend::error::Result<Topic>;
        async fn fetch_questions(
            &self,
            filter: &QuestionFilter,
        ) -> quiz_backend::error::Result<Vec<SourceQuestion>>;
    }
}

async fn setup_test_db() -> PgPool {
    dotenvy::dotenv().ok();
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to create test pool");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

fn source_question(id: &str, correct_option: i32) -> SourceQuestion {
    SourceQuestion {
        id: id.to_string(),
        name: format!("Question {}", id),
        question: format!("What about {}?", id),
        options: vec![
            AnswerOption {
                num: 0,
                text: "Alpha".to_string(),
            },
            AnswerOption {
                num: 1,
                text: "Beta".to_string(),
            },
            AnswerOption {
                num: 2,
                text: "Gamma".to_string(),
            },
            AnswerOption {
                num: 3,
                text: "Delta".to_string(),
            },
        ],
        correct_option,
        explanation: "Covered in the reading.".to_string(),
    }
}

fn serving_mock(question_count: usize) -> MockContentService {
    let mut mock = MockContentService::new();
    mock.expect_fetch_topic().returning(|topic_id| {
        Ok(Topic {
            id: topic_id.to_string(),
            name: "World History".to_string(),
            description: None,
        })
    });
    mock.expect_fetch_questions().returning(move |_| {
        Ok((0..question_count)
            .map(|i| source_question(&format!("src-{}", i), (i % 4) as i32))
            .collect())
    });
    mock
}

fn create_request(topic_id: &str, limit: i64) -> CreateQuizRequest {
    serde_json::from_value(serde_json::json!({
        "name": "History recap",
        "topic_id": topic_id,
        "limit": limit,
        "randomize": true,
        "passing_ratio": 0.7,
    }))
    .expect("valid request payload")
}

#[tokio::test]
async fn build_snapshots_every_returned_question_in_order() {
    let pool = setup_test_db().await;
    let service = QuizService::new(pool.clone(), Arc::new(serving_mock(5)));
    let user_id = format!("user-{}", Uuid::new_v4());

    let quiz = service
        .create_quiz(&user_id, create_request("topic-hist", 5))
        .await
        .expect("quiz created");

    assert_eq!(quiz.question_count, 5);
    assert_eq!(quiz.topic_name, "World History");

    let (_, questions) = service.get_quiz_details(quiz.id).await.unwrap();
    assert_eq!(questions.len(), quiz.question_count as usize);
    for (idx, question) in questions.iter().enumerate() {
        assert_eq!(question.order_index, idx as i32);
        assert_eq!(question.quiz_id, quiz.id);
    }
}

#[tokio::test]
async fn build_with_zero_questions_persists_nothing() {
    let pool = setup_test_db().await;
    let mut mock = MockContentService::new();
    mock.expect_fetch_topic().returning(|topic_id| {
        Ok(Topic {
            id: topic_id.to_string(),
            name: "Empty Topic".to_string(),
            description: None,
        })
    });
    mock.expect_fetch_questions().returning(|_| Ok(Vec::new()));

    let service = QuizService::new(pool.clone(), Arc::new(mock));
    let user_id = format!("user-{}", Uuid::new_v4());

    let err = service
        .create_quiz(&user_id, create_request("topic-empty", 10))
        .await
        .unwrap_err();
    match err {
        Error::QuestionsNotFound {
            topic_id,
            requested,
        } => {
            assert_eq!(topic_id, "topic-empty");
            assert_eq!(requested, 10);
        }
        other => panic!("expected QuestionsNotFound, got {:?}", other),
    }

    let query = QuizListQuery {
        user_id: Some(user_id),
        ..Default::default()
    };
    let quizzes = service.list_quizzes(&query).await.unwrap();
    assert!(quizzes.is_empty());
}

#[tokio::test]
async fn upstream_timeout_during_build_leaves_no_rows() {
    let pool = setup_test_db().await;
    let mut mock = MockContentService::new();
    mock.expect_fetch_topic().returning(|_| {
        Err(Error::UpstreamUnavailable(
            "question service unavailable (timeout)".to_string(),
        ))
    });

    let service = QuizService::new(pool.clone(), Arc::new(mock));
    let user_id = format!("user-{}", Uuid::new_v4());

    let err = service
        .create_quiz(&user_id, create_request("topic-hist", 5))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UpstreamUnavailable(_)));

    let query = QuizListQuery {
        user_id: Some(user_id),
        ..Default::default()
    };
    assert!(service.list_quizzes(&query).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_filters_by_question_count_range() {
    let pool = setup_test_db().await;
    let user_id = format!("user-{}", Uuid::new_v4());

    let small = QuizService::new(pool.clone(), Arc::new(serving_mock(3)));
    small
        .create_quiz(&user_id, create_request("topic-a", 3))
        .await
        .unwrap();
    let large = QuizService::new(pool.clone(), Arc::new(serving_mock(20)));
    large
        .create_quiz(&user_id, create_request("topic-b", 20))
        .await
        .unwrap();

    let query = QuizListQuery {
        user_id: Some(user_id.clone()),
        min_question_count: Some(10),
        ..Default::default()
    };
    let quizzes = large.list_quizzes(&query).await.unwrap();
    assert_eq!(quizzes.len(), 1);
    assert_eq!(quizzes[0].question_count, 20);

    let inverted = QuizListQuery {
        user_id: Some(user_id),
        min_question_count: Some(10),
        max_question_count: Some(5),
        ..Default::default()
    };
    assert!(matches!(
        large.list_quizzes(&inverted).await.unwrap_err(),
        Error::Validation(_)
    ));
}

#[tokio::test]
async fn metadata_update_is_the_only_mutation() {
    let pool = setup_test_db().await;
    let service = QuizService::new(pool.clone(), Arc::new(serving_mock(2)));
    let user_id = format!("user-{}", Uuid::new_v4());

    let quiz = service
        .create_quiz(&user_id, create_request("topic-hist", 2))
        .await
        .unwrap();
    assert!(quiz.updated_at.is_none());

    let payload: UpdateQuizRequest =
        serde_json::from_value(serde_json::json!({"name": "Renamed", "is_active": false}))
            .unwrap();
    let updated = service.update_quiz(quiz.id, payload).await.unwrap();
    assert_eq!(updated.name, "Renamed");
    assert!(!updated.is_active);
    assert!(updated.updated_at.is_some());
    assert_eq!(updated.question_count, quiz.question_count);
}

#[tokio::test]
async fn quiz_with_sessions_cannot_be_deleted() {
    let pool = setup_test_db().await;
    let service = QuizService::new(pool.clone(), Arc::new(serving_mock(2)));
    let sessions = SessionService::new(pool.clone());
    let user_id = format!("user-{}", Uuid::new_v4());

    let quiz = service
        .create_quiz(&user_id, create_request("topic-hist", 2))
        .await
        .unwrap();
    sessions.start_session(quiz.id, &user_id).await.unwrap();

    let err = service.delete_quiz(quiz.id).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    // Still listed: the guard rejected the delete outright.
    assert!(service.get_quiz(quiz.id).await.is_ok());
}

#[tokio::test]
async fn quiz_without_sessions_deletes_with_snapshots() {
    let pool = setup_test_db().await;
    let service = QuizService::new(pool.clone(), Arc::new(serving_mock(2)));
    let user_id = format!("user-{}", Uuid::new_v4());

    let quiz = service
        .create_quiz(&user_id, create_request("topic-hist", 2))
        .await
        .unwrap();
    service.delete_quiz(quiz.id).await.unwrap();

    assert!(matches!(
        service.get_quiz(quiz.id).await.unwrap_err(),
        Error::NotFound(_)
    ));
    let orphans: i64 =
        sqlx::query_scalar(r#"SELECT COUNT(*) FROM quiz_questions WHERE quiz_id = $1"#)
            .bind(quiz.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(orphans, 0);
}
