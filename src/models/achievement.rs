// src/models/achievement.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'achievements' table: the badge catalog.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Achievement {
    pub id: i64,
    pub name: String,
    pub description: String,

    /// Badge rarity: 'uncommon', 'rare', 'epic'.
    pub badge_type: String,

    pub icon: Option<String>,
}

/// An achievement a user has earned, with the earned timestamp.
#[derive(Debug, Serialize, FromRow)]
pub struct EarnedAchievement {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub badge_type: String,
    pub icon: Option<String>,
    pub earned_at: chrono::DateTime<chrono::Utc>,
}
