// src/handlers/achievement.rs

use axum::{Json, extract::State, response::IntoResponse};
use sqlx::PgPool;

use crate::{error::AppError, models::achievement::Achievement};

/// Lists the achievement catalog.
pub async fn list_achievements(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let achievements: Vec<Achievement> = sqlx::query_as(
        "SELECT id, name, description, badge_type, icon FROM achievements ORDER BY id",
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(achievements))
}
