// src/models/activity.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Activity type written when an attempt closes.
pub const ACTIVITY_QUIZ_COMPLETED: &str = "QUIZ_COMPLETED";

/// Represents the 'activities' table: a per-user event feed.
/// Rows are written in the same transaction that closes an attempt.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Activity {
    pub id: i64,
    pub user_id: i64,
    pub activity_type: String,
    pub description: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}
