// src/models/profile.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'profiles' table: one statistics row per user.
///
/// The aggregator overwrites its columns on every recompute.
/// `current_streak`, `highest_streak`, `completion_rate` and
/// `weakest_category` are stored but not derived by any current logic.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: i64,
    pub level: i32,
    pub quizzes_taken: i32,
    pub total_score: f64,
    pub win_rate: f64,
    pub current_streak: i32,
    pub highest_streak: i32,
    pub completion_rate: f64,
    pub time_played_seconds: f64,
    pub best_category: String,
    pub weakest_category: String,
}

/// Profile statistics as returned to clients, with a readable
/// time-played rendering alongside the raw seconds.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub level: i32,
    pub quizzes_taken: i32,
    pub total_score: f64,
    pub win_rate: f64,
    pub current_streak: i32,
    pub highest_streak: i32,
    pub completion_rate: f64,
    pub time_played_seconds: f64,
    pub time_played_display: String,
    pub best_category: String,
    pub weakest_category: String,
}

impl From<Profile> for ProfileResponse {
    fn from(p: Profile) -> Self {
        let time_played_display = format_time_played(p.time_played_seconds);
        ProfileResponse {
            level: p.level,
            quizzes_taken: p.quizzes_taken,
            total_score: p.total_score,
            win_rate: p.win_rate,
            current_streak: p.current_streak,
            highest_streak: p.highest_streak,
            completion_rate: p.completion_rate,
            time_played_seconds: p.time_played_seconds,
            time_played_display,
            best_category: p.best_category,
            weakest_category: p.weakest_category,
        }
    }
}

/// Formats total play time as "2h 30m".
fn format_time_played(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    format!("{}h {}m", hours, minutes)
}
