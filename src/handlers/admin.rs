// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        category::{CreateCategoryRequest, UpdateCategoryRequest},
        quiz::{CreateChoiceRequest, CreateQuestionRequest, CreateQuizRequest, UpdateQuizRequest},
        user::User,
    },
    utils::html::clean_html,
};

fn map_unique_violation(e: sqlx::Error, what: &str) -> AppError {
    if e.to_string().contains("unique constraint") || e.to_string().contains("23505") {
        AppError::Conflict(format!("{} already exists", what))
    } else {
        tracing::error!("Admin write failed: {:?}", e);
        AppError::InternalServerError(e.to_string())
    }
}

// ---- Users ----

/// Lists all users in the system.
/// Admin only.
pub async fn list_users(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let users: Vec<User> = sqlx::query_as(
        r#"
        SELECT id, username, password, role, created_at
        FROM users
        ORDER BY id DESC
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list users: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(users))
}

/// DTO for updating a user. Fields are optional.
#[derive(Debug, Deserialize)]
pub struct AdminUpdateUserRequest {
    pub username: Option<String>,
    pub role: Option<String>,
}

/// Updates user information.
/// Admin only.
pub async fn update_user(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<AdminUpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure_exists(&pool, "users", id, "User not found").await?;

    if let Some(new_username) = payload.username {
        sqlx::query("UPDATE users SET username = $1 WHERE id = $2")
            .bind(new_username)
            .bind(id)
            .execute(&pool)
            .await
            .map_err(|e| map_unique_violation(e, "Username"))?;
    }

    if let Some(new_role) = payload.role {
        if new_role != "user" && new_role != "admin" {
            return Err(AppError::BadRequest("Invalid role".to_string()));
        }
        sqlx::query("UPDATE users SET role = $1 WHERE id = $2")
            .bind(new_role)
            .bind(id)
            .execute(&pool)
            .await?;
    }

    Ok(Json(serde_json::json!({"id": id})))
}

/// Deletes a user. Attempts, profile and activities cascade.
/// Admin only.
pub async fn delete_user(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    ensure_exists(&pool, "users", id, "User not found").await?;

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ---- Categories ----

/// Creates a category.
/// Admin only.
pub async fn create_category(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO categories (name, slug, icon, description)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(&payload.name)
    .bind(&payload.slug)
    .bind(&payload.icon)
    .bind(clean_html(payload.description.as_deref().unwrap_or("")))
    .fetch_one(&pool)
    .await
    .map_err(|e| map_unique_violation(e, "Category"))?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// Updates a category.
/// Admin only.
pub async fn update_category(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    ensure_exists(&pool, "categories", id, "Category not found").await?;

    if let Some(name) = payload.name {
        sqlx::query("UPDATE categories SET name = $1 WHERE id = $2")
            .bind(name)
            .bind(id)
            .execute(&pool)
            .await
            .map_err(|e| map_unique_violation(e, "Category"))?;
    }
    if let Some(slug) = payload.slug {
        sqlx::query("UPDATE categories SET slug = $1 WHERE id = $2")
            .bind(slug)
            .bind(id)
            .execute(&pool)
            .await
            .map_err(|e| map_unique_violation(e, "Category"))?;
    }
    if let Some(icon) = payload.icon {
        sqlx::query("UPDATE categories SET icon = $1 WHERE id = $2")
            .bind(icon)
            .bind(id)
            .execute(&pool)
            .await?;
    }
    if let Some(description) = payload.description {
        sqlx::query("UPDATE categories SET description = $1 WHERE id = $2")
            .bind(clean_html(&description))
            .bind(id)
            .execute(&pool)
            .await?;
    }

    Ok(Json(serde_json::json!({"id": id})))
}

/// Deletes a category. Quizzes keep existing with category unset.
/// Admin only.
pub async fn delete_category(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    ensure_exists(&pool, "categories", id, "Category not found").await?;

    sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ---- Quizzes ----

/// Creates a quiz.
/// Admin only.
pub async fn create_quiz(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO quizzes (title, description, category_id, difficulty, time_limit_minutes, is_active)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(&payload.title)
    .bind(clean_html(payload.description.as_deref().unwrap_or("")))
    .bind(payload.category_id)
    .bind(payload.difficulty.as_deref().unwrap_or("EASY"))
    .bind(payload.time_limit_minutes.unwrap_or(10))
    .bind(payload.is_active.unwrap_or(true))
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create quiz: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// Updates a quiz.
/// Admin only.
pub async fn update_quiz(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    ensure_exists(&pool, "quizzes", id, "Quiz not found").await?;

    if let Some(title) = payload.title {
        sqlx::query("UPDATE quizzes SET title = $1, updated_at = NOW() WHERE id = $2")
            .bind(title)
            .bind(id)
            .execute(&pool)
            .await?;
    }
    if let Some(description) = payload.description {
        sqlx::query("UPDATE quizzes SET description = $1, updated_at = NOW() WHERE id = $2")
            .bind(clean_html(&description))
            .bind(id)
            .execute(&pool)
            .await?;
    }
    if let Some(category_id) = payload.category_id {
        sqlx::query("UPDATE quizzes SET category_id = $1, updated_at = NOW() WHERE id = $2")
            .bind(category_id)
            .bind(id)
            .execute(&pool)
            .await?;
    }
    if let Some(difficulty) = payload.difficulty {
        sqlx::query("UPDATE quizzes SET difficulty = $1, updated_at = NOW() WHERE id = $2")
            .bind(difficulty)
            .bind(id)
            .execute(&pool)
            .await?;
    }
    if let Some(limit) = payload.time_limit_minutes {
        sqlx::query("UPDATE quizzes SET time_limit_minutes = $1, updated_at = NOW() WHERE id = $2")
            .bind(limit)
            .bind(id)
            .execute(&pool)
            .await?;
    }
    if let Some(is_active) = payload.is_active {
        sqlx::query("UPDATE quizzes SET is_active = $1, updated_at = NOW() WHERE id = $2")
            .bind(is_active)
            .bind(id)
            .execute(&pool)
            .await?;
    }

    Ok(Json(serde_json::json!({"id": id})))
}

/// Deletes a quiz. Questions, choices and attempts cascade.
/// Admin only.
pub async fn delete_quiz(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    ensure_exists(&pool, "quizzes", id, "Quiz not found").await?;

    sqlx::query("DELETE FROM quizzes WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ---- Questions & choices ----

/// Creates a question on a quiz.
/// Admin only.
pub async fn create_question(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    ensure_exists(&pool, "quizzes", payload.quiz_id, "Quiz not found").await?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO questions (quiz_id, text, position) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(payload.quiz_id)
    .bind(clean_html(&payload.text))
    .bind(payload.position.unwrap_or(0))
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// Deletes a question and its choices.
/// Admin only.
pub async fn delete_question(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    ensure_exists(&pool, "questions", id, "Question not found").await?;

    sqlx::query("DELETE FROM questions WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Creates a choice on a question.
/// Admin only.
pub async fn create_choice(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateChoiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    ensure_exists(&pool, "questions", payload.question_id, "Question not found").await?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO choices (question_id, text, is_correct) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(payload.question_id)
    .bind(clean_html(&payload.text))
    .bind(payload.is_correct.unwrap_or(false))
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// Deletes a choice.
/// Admin only.
pub async fn delete_choice(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    ensure_exists(&pool, "choices", id, "Choice not found").await?;

    sqlx::query("DELETE FROM choices WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Existence check shared by the update/delete handlers.
async fn ensure_exists(
    pool: &PgPool,
    table: &str,
    id: i64,
    not_found: &str,
) -> Result<(), AppError> {
    // `table` only ever comes from the handlers above, never from input.
    let query = format!("SELECT id FROM {} WHERE id = $1", table);
    let exists: Option<i64> = sqlx::query_scalar(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    exists
        .map(|_| ())
        .ok_or(AppError::NotFound(not_found.to_string()))
}
