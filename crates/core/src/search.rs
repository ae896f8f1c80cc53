//! Substring search helpers.
//!
//! Issue search is a case-insensitive substring match (`ILIKE`) over title
//! and description. User text is escaped so `%`, `_` and `\` match literally.

/// Normalize a raw `search` query parameter.
///
/// Returns `None` for missing or whitespace-only input so callers can skip
/// the filter entirely.
pub fn normalize_search(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Escape `LIKE` metacharacters using `\` as the escape character.
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Build a `%term%` pattern for an `ILIKE ... ESCAPE '\'` clause.
pub fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like(term))
}
