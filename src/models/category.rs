// src/models/category.rs

use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::sync::OnceLock;
use url::Url;
use validator::Validate;

/// Represents the 'categories' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,

    /// Unique display name (e.g., "Science").
    pub name: String,

    /// URL-safe identifier (e.g., "science").
    pub slug: String,

    /// URL of the category icon, if any.
    pub icon: Option<String>,

    pub description: String,
}

/// Category row joined with its quiz count, as listed to clients.
#[derive(Debug, Serialize, FromRow)]
pub struct CategoryWithCount {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub icon: Option<String>,
    pub description: String,
    pub quiz_count: i64,
}

/// DTO for creating a category.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 100), custom(function = validate_slug))]
    pub slug: String,
    #[validate(length(max = 500), custom(function = validate_url_string))]
    pub icon: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

/// DTO for updating a category. Fields are optional.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100), custom(function = validate_slug))]
    pub slug: Option<String>,
    #[validate(length(max = 500), custom(function = validate_url_string))]
    pub icon: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

fn slug_regex() -> &'static Regex {
    static SLUG: OnceLock<Regex> = OnceLock::new();
    SLUG.get_or_init(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap())
}

/// Validates that a string is a lowercase, hyphen-separated slug.
fn validate_slug(slug: &str) -> Result<(), validator::ValidationError> {
    if !slug_regex().is_match(slug) {
        return Err(validator::ValidationError::new("invalid_slug"));
    }
    Ok(())
}

/// Validates that a string is a correctly formatted URL.
fn validate_url_string(url: &str) -> Result<(), validator::ValidationError> {
    if Url::parse(url).is_err() {
        return Err(validator::ValidationError::new("invalid_url"));
    }
    Ok(())
}
