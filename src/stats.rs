// src/stats.rs
//
// Profile statistics aggregator. Whenever an attempt closes, the owning
// user's statistics are recomputed from their full closed-attempt history
// and written back in one update. The computation itself is a pure
// function of that history, so recomputing with no new attempts always
// produces identical output.

use std::collections::BTreeMap;

use sqlx::PgConnection;
use sqlx::prelude::FromRow;

use crate::error::AppError;

/// A closed attempt counts as a win at or above this score.
pub const WIN_SCORE_THRESHOLD: f64 = 50.0;

/// Cumulative score needed per level: 1 level per 500 points.
pub const POINTS_PER_LEVEL: f64 = 500.0;

/// One closed attempt, as read for aggregation: its score, its duration,
/// and the name of the quiz's category (None when the category was
/// deleted out from under the quiz).
#[derive(Debug, Clone, FromRow)]
pub struct CompletedAttempt {
    pub score: f64,
    pub duration_seconds: Option<f64>,
    pub category: Option<String>,
}

/// The recomputed statistics snapshot written back to the profile row.
/// `best_category` is None when no attempt has a surviving category;
/// the stored value is then left unchanged rather than cleared.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileStats {
    pub level: i32,
    pub quizzes_taken: i32,
    pub total_score: f64,
    pub win_rate: f64,
    pub time_played_seconds: f64,
    pub best_category: Option<String>,
}

/// Computes the full statistics snapshot in a single pass over the
/// user's closed attempts.
pub fn compute(attempts: &[CompletedAttempt]) -> ProfileStats {
    let quizzes_taken = attempts.len() as i32;

    let mut total_score = 0.0;
    let mut wins = 0u32;
    let mut time_played_seconds = 0.0;
    // Keyed by category name; BTreeMap iteration order makes the
    // tie-break below deterministic (first name in ascending order).
    let mut by_category: BTreeMap<&str, (f64, u32)> = BTreeMap::new();

    for attempt in attempts {
        total_score += attempt.score;
        if attempt.score >= WIN_SCORE_THRESHOLD {
            wins += 1;
        }
        time_played_seconds += attempt.duration_seconds.unwrap_or(0.0);
        if let Some(category) = &attempt.category {
            let entry = by_category.entry(category.as_str()).or_insert((0.0, 0));
            entry.0 += attempt.score;
            entry.1 += 1;
        }
    }

    let win_rate = if quizzes_taken > 0 {
        (wins as f64 / quizzes_taken as f64) * 100.0
    } else {
        0.0
    };

    let level = (total_score / POINTS_PER_LEVEL).floor() as i32 + 1;

    let mut best_category = None;
    let mut best_mean = f64::NEG_INFINITY;
    for (name, (score_sum, count)) in &by_category {
        let mean = score_sum / *count as f64;
        if mean > best_mean {
            best_mean = mean;
            best_category = Some((*name).to_string());
        }
    }

    ProfileStats {
        level,
        quizzes_taken,
        total_score,
        win_rate,
        time_played_seconds,
        best_category,
    }
}

/// Recomputes and stores the statistics for one user.
///
/// Runs on the caller's connection so that when invoked from the
/// transaction closing an attempt, the read sees that attempt and the
/// profile write commits or rolls back together with the close.
pub async fn recompute_profile(conn: &mut PgConnection, user_id: i64) -> Result<(), AppError> {
    let attempts: Vec<CompletedAttempt> = sqlx::query_as(
        r#"
        SELECT a.score, a.duration_seconds, c.name AS category
        FROM attempts a
        JOIN quizzes q ON a.quiz_id = q.id
        LEFT JOIN categories c ON q.category_id = c.id
        WHERE a.user_id = $1 AND a.score IS NOT NULL
        "#,
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    let stats = compute(&attempts);

    sqlx::query(
        r#"
        UPDATE profiles
        SET level = $2,
            quizzes_taken = $3,
            total_score = $4,
            win_rate = $5,
            time_played_seconds = $6,
            best_category = COALESCE($7, best_category)
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .bind(stats.level)
    .bind(stats.quizzes_taken)
    .bind(stats.total_score)
    .bind(stats.win_rate)
    .bind(stats.time_played_seconds)
    .bind(stats.best_category)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
