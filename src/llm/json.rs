//! Text cleanup for model responses.
//!
//! Models wrap answers in markdown fences or add conversational text around a
//! JSON object. These helpers peel that off before parsing.

/// Slice from the first `{` to the last `}`.
///
/// Fences and prose on either side are dropped along with everything else
/// outside the braces. Returns `None` when no such span exists.
pub fn extract_json(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (start < end).then(|| &response[start..=end])
}

/// Remove a surrounding markdown code fence (with optional language tag).
pub fn strip_code_fences(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the language tag line, if any.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
