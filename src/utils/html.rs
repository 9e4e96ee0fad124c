use ammonia;

/// Clean HTML content using the ammonia library.
///
/// Whitelist-based sanitization: safe tags (like <b>, <p>) survive,
/// dangerous tags (<script>, <iframe>) and event-handler attributes are
/// stripped. Applied to admin-supplied rich text (category and quiz
/// descriptions, question and choice text) before storage, so no stored
/// XSS reaches quiz takers.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
