// src/scoring.rs

use std::collections::HashSet;

/// Fixed allowance added to a quiz's time limit before a submission
/// is rejected as late. Covers network latency on the final submit.
pub const GRACE_PERIOD_SECONDS: i64 = 30;

/// Counts how many submitted choice ids belong to the quiz's correct set.
///
/// Each element of `submitted` is tested independently: duplicates are
/// counted once per occurrence, and ids that don't belong to the quiz
/// simply never match.
pub fn count_correct(submitted: &[i64], correct: &HashSet<i64>) -> i64 {
    submitted.iter().filter(|id| correct.contains(*id)).count() as i64
}

/// Converts a correct-answer count into a percentage score with
/// 2-decimal precision. An empty quiz scores 0 rather than dividing
/// by zero.
pub fn score_percentage(correct_count: i64, total_questions: i64) -> f64 {
    if total_questions <= 0 {
        return 0.0;
    }
    let raw = (correct_count as f64 / total_questions as f64) * 100.0;
    (raw * 100.0).round() / 100.0
}

/// Whether an elapsed duration is still inside the submission window
/// for a quiz time limit. The boundary is inclusive: a submission at
/// exactly `limit + grace` is accepted.
pub fn within_time_limit(elapsed_seconds: f64, time_limit_minutes: i32) -> bool {
    elapsed_seconds <= allowed_seconds(time_limit_minutes)
}

/// Full submission window in seconds: the quiz limit plus the grace period.
pub fn allowed_seconds(time_limit_minutes: i32) -> f64 {
    (time_limit_minutes as i64 * 60 + GRACE_PERIOD_SECONDS) as f64
}

/// The quiz limit alone, as reported back to late submitters.
pub fn limit_seconds(time_limit_minutes: i32) -> f64 {
    (time_limit_minutes as i64 * 60) as f64
}
