//! Reply sanitizer.
//!
//! Models asked for "JSON only" still wrap it in code fences or add a
//! sentence before or after. This strips the fences and keeps the span from
//! the first `{` to the last `}` so the remainder parses as one object.

/// Reduce a raw model reply to its JSON object.
///
/// If the reply contains no `{` it is returned unchanged; the caller's
/// parse then fails and goes down the corrective-retry path.
pub fn sanitize_reply(raw: &str) -> String {
    let unfenced = raw.replace("```json", "").replace("```", "");
    let trimmed = unfenced.trim();

    let Some(start) = trimmed.find('{') else {
        return raw.to_string();
    };

    match trimmed.rfind('}') {
        Some(end) if end > start => trimmed[start..=end].to_string(),
        _ => trimmed[start..].to_string(),
    }
}
