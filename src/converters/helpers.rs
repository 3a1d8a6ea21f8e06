/// Splits `data:<mime>;base64,<data>` into its MIME type and payload.
/// The payload is returned as-is, without decoding.
pub fn parse_data_url(url: &str) -> Option<(String, String)> {
    let rest = url.strip_prefix("data:")?;
    let (header, data) = rest.split_once(',')?;

    let mut header_parts = header.split(';');
    let mime_type = header_parts.next()?.trim().to_string();
    if mime_type.is_empty() {
        return None;
    }
    // Only base64 payloads can be sent as inline data
    if header_parts.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
        return Some((mime_type, data.to_string()));
    }
    None
}

/// Strips a Markdown code fence (```json ... ```) some models wrap JSON in.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    // Drop the language tag on the opening line
    match inner.split_once('\n') {
        Some((tag, body)) if tag.trim().chars().all(|c| c.is_ascii_alphanumeric()) => body.trim(),
        _ => inner.trim(),
    }
}

pub fn truncate(s: &str, max_len: usize) -> String {
    match s.char_indices().nth(max_len) {
        None => s.to_string(),
        Some((idx, _)) => format!("{}…", &s[..idx]),
    }
}
