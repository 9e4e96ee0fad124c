// src/handlers/quiz.rs

use std::collections::{HashMap, HashSet};

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{
        activity::ACTIVITY_QUIZ_COMPLETED,
        attempt::{AttemptHistoryEntry, OpenAttemptRow, SubmitAttemptRequest},
        quiz::{PublicChoice, PublicQuestion, Question, QuizDetail, QuizListParams, QuizSummary},
    },
    scoring, stats,
    utils::jwt::Claims,
};

/// Helper struct for the quiz columns submission needs.
#[derive(sqlx::FromRow)]
struct QuizForSubmit {
    title: String,
    time_limit_minutes: i32,
}

/// Helper struct for the quiz detail header.
#[derive(sqlx::FromRow)]
struct QuizHeader {
    id: i64,
    title: String,
    description: String,
    category_name: Option<String>,
    difficulty: String,
    time_limit_minutes: i32,
}

/// Lists active quizzes, optionally filtered by category slug and
/// searched by title.
pub async fn list_quizzes(
    State(pool): State<PgPool>,
    Query(params): Query<QuizListParams>,
) -> Result<impl IntoResponse, AppError> {
    let search_pattern = params.search.map(|k| format!("%{}%", k));

    let quizzes: Vec<QuizSummary> = sqlx::query_as(
        r#"
        SELECT
            q.id, q.title, q.description, q.category_id,
            c.name AS category_name,
            q.difficulty, q.time_limit_minutes,
            (SELECT COUNT(*) FROM questions WHERE quiz_id = q.id) AS question_count,
            q.created_at
        FROM quizzes q
        LEFT JOIN categories c ON q.category_id = c.id
        WHERE q.is_active
          AND ($1::TEXT IS NULL OR c.slug = $1)
          AND ($2::TEXT IS NULL OR q.title ILIKE $2)
        ORDER BY q.created_at DESC
        "#,
    )
    .bind(params.category)
    .bind(search_pattern)
    .fetch_all(&pool)
    .await?;

    Ok(Json(quizzes))
}

/// Full quiz detail for the taking screen: ordered questions with their
/// choices, correctness flags stripped.
pub async fn get_quiz(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let header: QuizHeader = sqlx::query_as(
        r#"
        SELECT q.id, q.title, q.description, c.name AS category_name,
               q.difficulty, q.time_limit_minutes
        FROM quizzes q
        LEFT JOIN categories c ON q.category_id = c.id
        WHERE q.id = $1 AND q.is_active
        "#,
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    let questions: Vec<Question> = sqlx::query_as(
        "SELECT id, quiz_id, text, position FROM questions WHERE quiz_id = $1 ORDER BY position, id",
    )
    .bind(id)
    .fetch_all(&pool)
    .await?;

    let choices: Vec<PublicChoice> = sqlx::query_as(
        r#"
        SELECT c.id, c.question_id, c.text
        FROM choices c
        JOIN questions q ON c.question_id = q.id
        WHERE q.quiz_id = $1
        ORDER BY c.id
        "#,
    )
    .bind(id)
    .fetch_all(&pool)
    .await?;

    let mut choices_by_question: HashMap<i64, Vec<PublicChoice>> = HashMap::new();
    for choice in choices {
        choices_by_question
            .entry(choice.question_id)
            .or_default()
            .push(choice);
    }

    let questions = questions
        .into_iter()
        .map(|q| PublicQuestion {
            id: q.id,
            text: q.text,
            position: q.position,
            choices: choices_by_question.remove(&q.id).unwrap_or_default(),
        })
        .collect();

    Ok(Json(QuizDetail {
        id: header.id,
        title: header.title,
        description: header.description,
        category_name: header.category_name,
        difficulty: header.difficulty,
        time_limit_minutes: header.time_limit_minutes,
        questions,
    }))
}

/// Starts a quiz attempt: records the start time and hands the client
/// an attempt id plus the time limit for its countdown display.
///
/// A user may hold several open attempts for the same quiz; every start
/// is independent. Statistics are untouched until the attempt closes.
pub async fn start_quiz(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.sub.parse::<i64>().unwrap_or(0);

    let quiz: QuizForSubmit =
        sqlx::query_as("SELECT title, time_limit_minutes FROM quizzes WHERE id = $1 AND is_active")
            .bind(quiz_id)
            .fetch_optional(&pool)
            .await?
            .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    let attempt_id: i64 = sqlx::query_scalar(
        "INSERT INTO attempts (user_id, quiz_id, started_at) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(user_id)
    .bind(quiz_id)
    .bind(chrono::Utc::now())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create attempt: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": format!("Quiz '{}' started.", quiz.title),
            "attempt_id": attempt_id,
            "quiz_id": quiz_id,
            "time_limit": quiz.time_limit_minutes,
        })),
    ))
}

/// Submits a quiz attempt: validates ownership, state and the time
/// window, scores the answers, and closes the attempt.
///
/// The whole sequence runs in one transaction with the attempt row
/// locked, so of two concurrent submissions exactly one closes the
/// attempt and the other observes it already submitted. The close, the
/// activity record and the statistics recompute commit together; any
/// failure leaves the attempt open and unscored.
pub async fn submit_quiz(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SubmitAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.sub.parse::<i64>().unwrap_or(0);

    let mut tx = pool.begin().await?;

    // Scoping the lookup by user id keeps cross-user submissions
    // indistinguishable from a missing attempt.
    let attempt: OpenAttemptRow = sqlx::query_as(
        "SELECT id, quiz_id, started_at, score FROM attempts WHERE id = $1 AND user_id = $2 FOR UPDATE",
    )
    .bind(req.attempt_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AppError::NotFound("Attempt not found".to_string()))?;

    if attempt.score.is_some() {
        return Err(AppError::BadRequest(
            "This attempt has already been submitted.".to_string(),
        ));
    }

    let answer_ids = parse_answer_ids(&req.answers)?;

    let quiz: QuizForSubmit =
        sqlx::query_as("SELECT title, time_limit_minutes FROM quizzes WHERE id = $1")
            .bind(attempt.quiz_id)
            .fetch_one(&mut *tx)
            .await?;

    let now = chrono::Utc::now();
    let elapsed = now - attempt.started_at;
    let elapsed_seconds = elapsed.num_milliseconds() as f64 / 1000.0;

    // A late submission fails without closing the attempt; the rollback
    // leaves the row open, permanently past its window.
    if !scoring::within_time_limit(elapsed_seconds, quiz.time_limit_minutes) {
        return Err(AppError::TimeLimitExceeded {
            elapsed_seconds,
            limit_seconds: scoring::limit_seconds(quiz.time_limit_minutes),
        });
    }

    let correct_ids: Vec<i64> = sqlx::query_scalar(
        r#"
        SELECT c.id
        FROM choices c
        JOIN questions q ON c.question_id = q.id
        WHERE q.quiz_id = $1 AND c.is_correct
        "#,
    )
    .bind(attempt.quiz_id)
    .fetch_all(&mut *tx)
    .await?;
    let correct_set: HashSet<i64> = correct_ids.into_iter().collect();

    // Question count is read at submit time, not start time.
    let total_questions: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE quiz_id = $1")
            .bind(attempt.quiz_id)
            .fetch_one(&mut *tx)
            .await?;

    let correct_count = scoring::count_correct(&answer_ids, &correct_set);
    let score = scoring::score_percentage(correct_count, total_questions);

    sqlx::query(
        r#"
        UPDATE attempts
        SET score = $2,
            correct_answers = $3,
            total_questions = $4,
            completed_at = $5,
            duration_seconds = $6
        WHERE id = $1
        "#,
    )
    .bind(attempt.id)
    .bind(score)
    .bind(correct_count as i32)
    .bind(total_questions as i32)
    .bind(now)
    .bind(elapsed_seconds)
    .execute(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO activities (user_id, activity_type, description) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(ACTIVITY_QUIZ_COMPLETED)
        .bind(format!(
            "Completed '{}' with a score of {}%",
            quiz.title, score
        ))
        .execute(&mut *tx)
        .await?;

    stats::recompute_profile(&mut *tx, user_id).await?;

    tx.commit().await?;

    Ok(Json(serde_json::json!({
        "id": attempt.id,
        "score": score,
        "correct_answers": correct_count,
        "total_questions": total_questions,
        "message": "Results calculated and saved successfully.",
    })))
}

/// Lists the current user's attempts, newest completion first.
pub async fn quiz_history(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.sub.parse::<i64>().unwrap_or(0);

    let history: Vec<AttemptHistoryEntry> = sqlx::query_as(
        r#"
        SELECT a.id, a.quiz_id, q.title AS quiz_title,
               a.score, a.correct_answers, a.total_questions,
               a.started_at, a.completed_at, a.duration_seconds
        FROM attempts a
        JOIN quizzes q ON a.quiz_id = q.id
        WHERE a.user_id = $1
        ORDER BY a.completed_at DESC NULLS LAST, a.started_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(history))
}

/// Validates the answers payload: it must be a JSON array of choice ids.
fn parse_answer_ids(value: &serde_json::Value) -> Result<Vec<i64>, AppError> {
    let items = value
        .as_array()
        .ok_or_else(|| AppError::BadRequest("answers must be a list".to_string()))?;

    items
        .iter()
        .map(|item| {
            item.as_i64()
                .ok_or_else(|| AppError::BadRequest("answers must be a list of choice ids".to_string()))
        })
        .collect()
}
