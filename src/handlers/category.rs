// src/handlers/category.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{error::AppError, models::category::CategoryWithCount};

/// Lists all categories with their quiz counts.
pub async fn list_categories(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let categories: Vec<CategoryWithCount> = sqlx::query_as(
        r#"
        SELECT c.id, c.name, c.slug, c.icon, c.description,
               (SELECT COUNT(*) FROM quizzes WHERE category_id = c.id) AS quiz_count
        FROM categories c
        ORDER BY c.name
        "#,
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(categories))
}

/// Retrieves a single category by slug.
pub async fn get_category(
    State(pool): State<PgPool>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let category: CategoryWithCount = sqlx::query_as(
        r#"
        SELECT c.id, c.name, c.slug, c.icon, c.description,
               (SELECT COUNT(*) FROM quizzes WHERE category_id = c.id) AS quiz_count
        FROM categories c
        WHERE c.slug = $1
        "#,
    )
    .bind(slug)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Category not found".to_string()))?;

    Ok(Json(category))
}
