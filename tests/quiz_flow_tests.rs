// tests/quiz_flow_tests.rs
//
// Integration tests for the attempt lifecycle: start, submit, scoring,
// time-limit enforcement and double-submission rejection.

use quizhub::{config::Config, routes, state::AppState};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

async fn spawn_app() -> String {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: database_url.clone(),
        jwt_secret: "quiz_flow_test_secret".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        admin_username: None,
        admin_password: None,
    };

    let state = AppState { pool, config };
    let app = routes::create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

async fn test_pool() -> PgPool {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .unwrap()
}

/// Registers a fresh user and logs in. Returns (token, user_id).
async fn register_and_login(client: &reqwest::Client, address: &str) -> (String, i64) {
    let username = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let password = "password123";

    let register: serde_json::Value = client
        .post(&format!("{}/api/auth/register", address))
        .json(&serde_json::json!({"username": username, "password": password}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let user_id = register["id"].as_i64().expect("register returns user id");

    let login: serde_json::Value = client
        .post(&format!("{}/api/auth/login", address))
        .json(&serde_json::json!({"username": username, "password": password}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let token = login["token"].as_str().expect("login returns token").to_string();

    (token, user_id)
}

/// Seeds a category plus a 2-question quiz (10 minute limit).
/// Returns (quiz_id, correct_choice_ids, wrong_choice_ids).
async fn seed_quiz(pool: &PgPool) -> (i64, Vec<i64>, Vec<i64>) {
    let tag = &uuid::Uuid::new_v4().to_string()[..8];

    let category_id: i64 = sqlx::query_scalar(
        "INSERT INTO categories (name, slug) VALUES ($1, $2) RETURNING id",
    )
    .bind(format!("Science {}", tag))
    .bind(format!("science-{}", tag))
    .fetch_one(pool)
    .await
    .unwrap();

    let quiz_id: i64 = sqlx::query_scalar(
        "INSERT INTO quizzes (title, category_id, time_limit_minutes) VALUES ($1, $2, 10) RETURNING id",
    )
    .bind(format!("Biology Quiz {}", tag))
    .bind(category_id)
    .fetch_one(pool)
    .await
    .unwrap();

    let mut correct_ids = Vec::new();
    let mut wrong_ids = Vec::new();
    for (text, correct, wrong) in [
        ("What is a cell?", "Basic unit of life", "A car part"),
        ("What is DNA?", "Genetic material", "A type of food"),
    ] {
        let question_id: i64 = sqlx::query_scalar(
            "INSERT INTO questions (quiz_id, text) VALUES ($1, $2) RETURNING id",
        )
        .bind(quiz_id)
        .bind(text)
        .fetch_one(pool)
        .await
        .unwrap();

        let correct_id: i64 = sqlx::query_scalar(
            "INSERT INTO choices (question_id, text, is_correct) VALUES ($1, $2, TRUE) RETURNING id",
        )
        .bind(question_id)
        .bind(correct)
        .fetch_one(pool)
        .await
        .unwrap();
        correct_ids.push(correct_id);

        let wrong_id: i64 = sqlx::query_scalar(
            "INSERT INTO choices (question_id, text, is_correct) VALUES ($1, $2, FALSE) RETURNING id",
        )
        .bind(question_id)
        .bind(wrong)
        .fetch_one(pool)
        .await
        .unwrap();
        wrong_ids.push(wrong_id);
    }

    (quiz_id, correct_ids, wrong_ids)
}

async fn start_attempt(
    client: &reqwest::Client,
    address: &str,
    token: &str,
    quiz_id: i64,
) -> i64 {
    let response: serde_json::Value = client
        .post(&format!("{}/api/quizzes/{}/start", address, quiz_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    response["attempt_id"].as_i64().expect("start returns attempt_id")
}

#[tokio::test]
async fn start_quiz_creates_attempt() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let pool = test_pool().await;
    let (token, user_id) = register_and_login(&client, &address).await;
    let (quiz_id, _, _) = seed_quiz(&pool).await;

    let response = client
        .post(&format!("{}/api/quizzes/{}/start", address, quiz_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["attempt_id"].as_i64().is_some());
    assert_eq!(body["quiz_id"].as_i64(), Some(quiz_id));
    assert_eq!(body["time_limit"].as_i64(), Some(10));

    // The attempt row exists and is open
    let open_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM attempts WHERE user_id = $1 AND quiz_id = $2 AND score IS NULL",
    )
    .bind(user_id)
    .bind(quiz_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(open_count, 1);
}

#[tokio::test]
async fn start_inactive_quiz_not_found() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let pool = test_pool().await;
    let (token, _) = register_and_login(&client, &address).await;
    let (quiz_id, _, _) = seed_quiz(&pool).await;

    sqlx::query("UPDATE quizzes SET is_active = FALSE WHERE id = $1")
        .bind(quiz_id)
        .execute(&pool)
        .await
        .unwrap();

    let response = client
        .post(&format!("{}/api/quizzes/{}/start", address, quiz_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn submit_correct_answers_scores_100() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let pool = test_pool().await;
    let (token, _) = register_and_login(&client, &address).await;
    let (quiz_id, correct_ids, _) = seed_quiz(&pool).await;
    let attempt_id = start_attempt(&client, &address, &token, quiz_id).await;

    let response = client
        .post(&format!("{}/api/quizzes/submit", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({"attempt_id": attempt_id, "answers": correct_ids}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["score"].as_f64(), Some(100.0));
    assert_eq!(body["correct_answers"].as_i64(), Some(2));
    assert_eq!(body["total_questions"].as_i64(), Some(2));
}

#[tokio::test]
async fn submit_wrong_answers_scores_0() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let pool = test_pool().await;
    let (token, _) = register_and_login(&client, &address).await;
    let (quiz_id, _, wrong_ids) = seed_quiz(&pool).await;
    let attempt_id = start_attempt(&client, &address, &token, quiz_id).await;

    let response = client
        .post(&format!("{}/api/quizzes/submit", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({"attempt_id": attempt_id, "answers": wrong_ids}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["score"].as_f64(), Some(0.0));
    assert_eq!(body["correct_answers"].as_i64(), Some(0));
}

#[tokio::test]
async fn partial_answers_score_half() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let pool = test_pool().await;
    let (token, _) = register_and_login(&client, &address).await;
    let (quiz_id, correct_ids, wrong_ids) = seed_quiz(&pool).await;
    let attempt_id = start_attempt(&client, &address, &token, quiz_id).await;

    // One correct, one wrong
    let answers = vec![correct_ids[0], wrong_ids[1]];
    let body: serde_json::Value = client
        .post(&format!("{}/api/quizzes/submit", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({"attempt_id": attempt_id, "answers": answers}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["score"].as_f64(), Some(50.0));
    assert_eq!(body["correct_answers"].as_i64(), Some(1));
    assert_eq!(body["total_questions"].as_i64(), Some(2));
}

#[tokio::test]
async fn cannot_submit_same_attempt_twice() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let pool = test_pool().await;
    let (token, _) = register_and_login(&client, &address).await;
    let (quiz_id, correct_ids, wrong_ids) = seed_quiz(&pool).await;
    let attempt_id = start_attempt(&client, &address, &token, quiz_id).await;

    // First submission wins
    let first = client
        .post(&format!("{}/api/quizzes/submit", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({"attempt_id": attempt_id, "answers": correct_ids}))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status().as_u16(), 200);

    // Second submission is rejected regardless of payload
    let second = client
        .post(&format!("{}/api/quizzes/submit", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({"attempt_id": attempt_id, "answers": wrong_ids}))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status().as_u16(), 400);
    let body: serde_json::Value = second.json().await.unwrap();
    assert!(
        body["error"].as_str().unwrap().contains("already been submitted"),
        "unexpected error: {}",
        body
    );

    // The stored score is still the one from the first submission
    let stored: f64 = sqlx::query_scalar("SELECT score FROM attempts WHERE id = $1")
        .bind(attempt_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, 100.0);
}

#[tokio::test]
async fn submit_after_time_limit_forbidden() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let pool = test_pool().await;
    let (token, user_id) = register_and_login(&client, &address).await;
    let (quiz_id, correct_ids, _) = seed_quiz(&pool).await;

    // An attempt that started 15 minutes ago (limit is 10 minutes)
    let attempt_id: i64 = sqlx::query_scalar(
        "INSERT INTO attempts (user_id, quiz_id, started_at)
         VALUES ($1, $2, NOW() - INTERVAL '15 minutes') RETURNING id",
    )
    .bind(user_id)
    .bind(quiz_id)
    .fetch_one(&pool)
    .await
    .unwrap();

    let response = client
        .post(&format!("{}/api/quizzes/submit", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({"attempt_id": attempt_id, "answers": correct_ids}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 403);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Time limit exceeded.");
    assert!(body["elapsed_seconds"].as_f64().unwrap() > 600.0);
    assert_eq!(body["limit_seconds"].as_f64(), Some(600.0));

    // The attempt is NOT closed by the barred submission
    let score: Option<f64> = sqlx::query_scalar("SELECT score FROM attempts WHERE id = $1")
        .bind(attempt_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(score.is_none());
}

#[tokio::test]
async fn submit_non_list_answers_bad_request() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let pool = test_pool().await;
    let (token, _) = register_and_login(&client, &address).await;
    let (quiz_id, _, _) = seed_quiz(&pool).await;
    let attempt_id = start_attempt(&client, &address, &token, quiz_id).await;

    let response = client
        .post(&format!("{}/api/quizzes/submit", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({"attempt_id": attempt_id, "answers": "10,20"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "answers must be a list");
}

#[tokio::test]
async fn submit_foreign_attempt_not_found() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let pool = test_pool().await;
    let (token_a, _) = register_and_login(&client, &address).await;
    let (token_b, _) = register_and_login(&client, &address).await;
    let (quiz_id, correct_ids, _) = seed_quiz(&pool).await;
    let attempt_id = start_attempt(&client, &address, &token_a, quiz_id).await;

    // User B tries to submit user A's attempt
    let response = client
        .post(&format!("{}/api/quizzes/submit", address))
        .header("Authorization", format!("Bearer {}", token_b))
        .json(&serde_json::json!({"attempt_id": attempt_id, "answers": correct_ids}))
        .send()
        .await
        .unwrap();

    // Cross-user submission must not leak existence
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn empty_quiz_scores_zero() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let pool = test_pool().await;
    let (token, _) = register_and_login(&client, &address).await;

    let quiz_id: i64 = sqlx::query_scalar(
        "INSERT INTO quizzes (title, time_limit_minutes) VALUES ($1, 10) RETURNING id",
    )
    .bind(format!("Empty Quiz {}", &uuid::Uuid::new_v4().to_string()[..8]))
    .fetch_one(&pool)
    .await
    .unwrap();
    let attempt_id = start_attempt(&client, &address, &token, quiz_id).await;

    let response = client
        .post(&format!("{}/api/quizzes/submit", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({"attempt_id": attempt_id, "answers": []}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["score"].as_f64(), Some(0.0));
    assert_eq!(body["total_questions"].as_i64(), Some(0));
}

#[tokio::test]
async fn quiz_detail_hides_correct_flags() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let pool = test_pool().await;
    let (quiz_id, _, _) = seed_quiz(&pool).await;

    let body: serde_json::Value = client
        .get(&format!("{}/api/quizzes/{}", address, quiz_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let questions = body["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 2);
    for question in questions {
        let choices = question["choices"].as_array().unwrap();
        assert_eq!(choices.len(), 2);
        for choice in choices {
            assert!(choice.get("is_correct").is_none(), "is_correct leaked: {}", choice);
            assert!(choice["id"].as_i64().is_some());
            assert!(choice["text"].as_str().is_some());
        }
    }
}

#[tokio::test]
async fn history_lists_attempts_newest_first() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let pool = test_pool().await;
    let (token, _) = register_and_login(&client, &address).await;
    let (quiz_id, correct_ids, wrong_ids) = seed_quiz(&pool).await;

    for answers in [&wrong_ids, &correct_ids] {
        let attempt_id = start_attempt(&client, &address, &token, quiz_id).await;
        client
            .post(&format!("{}/api/quizzes/submit", address))
            .header("Authorization", format!("Bearer {}", token))
            .json(&serde_json::json!({"attempt_id": attempt_id, "answers": answers}))
            .send()
            .await
            .unwrap();
    }

    let history: Vec<serde_json::Value> = client
        .get(&format!("{}/api/quizzes/history", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(history.len(), 2);
    // Newest completion first: the 100% run was submitted last
    assert_eq!(history[0]["score"].as_f64(), Some(100.0));
    assert_eq!(history[1]["score"].as_f64(), Some(0.0));
    assert!(history[0]["quiz_title"].as_str().unwrap().contains("Biology"));
}
