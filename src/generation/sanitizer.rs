//! Model Output Sanitization
//!
//! Models do not reliably honor "no markdown" instructions, so the raw
//! completion is cleaned before anything else looks at it. Applying
//! `sanitize` to its own output is a no-op.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LEADING_FENCE: Regex = Regex::new(r"(?i)^```(?:sql)?\s*").unwrap();
    static ref TRAILING_FENCE: Regex = Regex::new(r"\s*```\s*$").unwrap();
    static ref QUERY_LABEL: Regex = Regex::new(r"(?i)^SQL\s*Query\s*:\s*").unwrap();
    static ref FIRST_SELECT: Regex = Regex::new(r"(?i)SELECT[\s\S]*?;").unwrap();
}

/// Recover the first plausible SQL statement from a raw completion.
pub fn sanitize(raw: &str) -> String {
    let cleaned = raw.trim();
    if cleaned.is_empty() {
        return String::new();
    }

    let cleaned = LEADING_FENCE.replace(cleaned, "");
    let cleaned = TRAILING_FENCE.replace(&cleaned, "");
    let cleaned = QUERY_LABEL.replace(&cleaned, "");

    match FIRST_SELECT.find(&cleaned) {
        Some(statement) => statement.as_str().trim().to_string(),
        None => cleaned.trim().to_string(),
    }
}
