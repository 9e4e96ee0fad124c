// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    pub title: String,
    pub description: String,

    /// Nullable: the category may have been deleted.
    pub category_id: Option<i64>,

    /// 'EASY', 'MEDIUM' or 'HARD'.
    pub difficulty: String,

    pub time_limit_minutes: i32,
    pub is_active: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Quiz row as listed to clients, joined with category name and
/// question count.
#[derive(Debug, Serialize, FromRow)]
pub struct QuizSummary {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub difficulty: String,
    pub time_limit_minutes: i32,
    pub question_count: i64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub quiz_id: i64,
    pub text: String,
    pub position: i32,
}

/// Represents the 'choices' table in the database.
/// Never serialized to quiz takers; see `PublicChoice`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Choice {
    pub id: i64,
    pub question_id: i64,
    pub text: String,
    pub is_correct: bool,
}

/// Choice as shown to quiz takers: no correctness flag.
#[derive(Debug, Serialize, FromRow)]
pub struct PublicChoice {
    pub id: i64,
    #[serde(skip)]
    pub question_id: i64,
    pub text: String,
}

/// Question with its choices, correctness stripped.
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub text: String,
    pub position: i32,
    pub choices: Vec<PublicChoice>,
}

/// Full quiz detail for the taking screen.
#[derive(Debug, Serialize)]
pub struct QuizDetail {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category_name: Option<String>,
    pub difficulty: String,
    pub time_limit_minutes: i32,
    pub questions: Vec<PublicQuestion>,
}

/// Query parameters for listing quizzes.
#[derive(Debug, Deserialize)]
pub struct QuizListParams {
    /// Category slug filter.
    pub category: Option<String>,

    /// Title search keyword.
    pub search: Option<String>,
}

/// DTO for creating a quiz.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuizRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 20000))]
    pub description: Option<String>,
    pub category_id: Option<i64>,
    #[validate(custom(function = validate_difficulty))]
    pub difficulty: Option<String>,
    #[validate(range(min = 1, max = 600))]
    pub time_limit_minutes: Option<i32>,
    pub is_active: Option<bool>,
}

/// DTO for updating a quiz. Fields are optional.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuizRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(max = 20000))]
    pub description: Option<String>,
    pub category_id: Option<i64>,
    #[validate(custom(function = validate_difficulty))]
    pub difficulty: Option<String>,
    #[validate(range(min = 1, max = 600))]
    pub time_limit_minutes: Option<i32>,
    pub is_active: Option<bool>,
}

/// DTO for creating a question.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    pub quiz_id: i64,
    #[validate(length(min = 1, max = 2000))]
    pub text: String,
    pub position: Option<i32>,
}

/// DTO for creating a choice.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateChoiceRequest {
    pub question_id: i64,
    #[validate(length(min = 1, max = 500))]
    pub text: String,
    pub is_correct: Option<bool>,
}

fn validate_difficulty(value: &str) -> Result<(), validator::ValidationError> {
    match value {
        "EASY" | "MEDIUM" | "HARD" => Ok(()),
        _ => Err(validator::ValidationError::new("invalid_difficulty")),
    }
}
