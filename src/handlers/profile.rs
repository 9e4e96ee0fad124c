// src/handlers/profile.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Serialize;
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{
        achievement::EarnedAchievement,
        activity::Activity,
        profile::{Profile, ProfileResponse},
        user::User,
    },
    utils::jwt::Claims,
};

/// User account plus statistics and earned achievements, as returned by
/// both the own-profile and public-profile endpoints.
#[derive(Debug, Serialize)]
pub struct UserProfileResponse {
    pub id: i64,
    pub username: String,
    pub role: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub profile: ProfileResponse,
    pub earned_achievements: Vec<EarnedAchievement>,
}

async fn load_user_profile(pool: &PgPool, user: User) -> Result<UserProfileResponse, AppError> {
    let profile: Profile = sqlx::query_as(
        r#"
        SELECT user_id, level, quizzes_taken, total_score, win_rate,
               current_streak, highest_streak, completion_rate,
               time_played_seconds, best_category, weakest_category
        FROM profiles
        WHERE user_id = $1
        "#,
    )
    .bind(user.id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Profile not found".to_string()))?;

    let earned_achievements: Vec<EarnedAchievement> = sqlx::query_as(
        r#"
        SELECT a.id, a.name, a.description, a.badge_type, a.icon, ua.earned_at
        FROM user_achievements ua
        JOIN achievements a ON ua.achievement_id = a.id
        WHERE ua.user_id = $1
        ORDER BY ua.earned_at DESC
        "#,
    )
    .bind(user.id)
    .fetch_all(pool)
    .await?;

    Ok(UserProfileResponse {
        id: user.id,
        username: user.username,
        role: user.role,
        created_at: user.created_at,
        profile: profile.into(),
        earned_achievements,
    })
}

/// Get current user's profile and statistics.
pub async fn get_me(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.sub.parse::<i64>().unwrap_or(0);

    let user: User =
        sqlx::query_as("SELECT id, username, password, role, created_at FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&pool)
            .await?
            .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(Json(load_user_profile(&pool, user).await?))
}

/// Public profile lookup by username.
pub async fn get_profile(
    State(pool): State<PgPool>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user: User = sqlx::query_as(
        "SELECT id, username, password, role, created_at FROM users WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(Json(load_user_profile(&pool, user).await?))
}

/// List the current user's recent activity feed.
pub async fn list_my_activities(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.sub.parse::<i64>().unwrap_or(0);

    let activities: Vec<Activity> = sqlx::query_as(
        r#"
        SELECT id, user_id, activity_type, description, created_at
        FROM activities
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT 50
        "#,
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(activities))
}
