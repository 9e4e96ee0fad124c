// src/models/attempt.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'attempts' table in the database.
///
/// An attempt is open while `score` is NULL and closed once scored;
/// the result columns flip from NULL to set exactly once, together
/// (enforced by CHECK constraints on the table).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Attempt {
    pub id: i64,
    pub user_id: i64,
    pub quiz_id: i64,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub duration_seconds: Option<f64>,
    pub score: Option<f64>,
    pub correct_answers: Option<i32>,
    pub total_questions: Option<i32>,
}

/// The slice of an attempt row read under lock during submission.
#[derive(Debug, FromRow)]
pub struct OpenAttemptRow {
    pub id: i64,
    pub quiz_id: i64,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub score: Option<f64>,
}

/// History row: attempt joined with its quiz title.
#[derive(Debug, Serialize, FromRow)]
pub struct AttemptHistoryEntry {
    pub id: i64,
    pub quiz_id: i64,
    pub quiz_title: String,
    pub score: Option<f64>,
    pub correct_answers: Option<i32>,
    pub total_questions: Option<i32>,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub duration_seconds: Option<f64>,
}

/// DTO for submitting an attempt.
///
/// `answers` stays untyped here so the handler can reject a non-list
/// payload with a 400 instead of a deserialization error. A missing
/// field means "no answers", not a malformed request.
#[derive(Debug, Deserialize)]
pub struct SubmitAttemptRequest {
    pub attempt_id: i64,

    /// Expected: a JSON array of choice ids.
    #[serde(default = "empty_answers")]
    pub answers: serde_json::Value,
}

fn empty_answers() -> serde_json::Value {
    serde_json::Value::Array(Vec::new())
}
