use axum::http::HeaderMap;

use crate::error::GatewayError;

// HTTP helpers
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(axum::http::header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|cookie| cookie.split(';'))
        .find_map(|part| {
            let (key, value) = part.trim().split_once('=')?;
            (key.trim() == name).then(|| value.trim().to_string())
        })
        .filter(|v| !v.is_empty())
}

pub fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn mask_token(token: &str) -> String {
    if token.len() <= 8 || !token.is_ascii() {
        return "****".to_string();
    }
    let (start, end) = (&token[..4], &token[token.len() - 4..]);
    format!("{}****{}", start, end)
}

/// Guards ids that get spliced into a backend path.
pub fn path_segment(raw: &str) -> Result<&str, GatewayError> {
    let ok = !raw.is_empty()
        && raw != "."
        && raw != ".."
        && raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'));
    if ok {
        Ok(raw)
    } else {
        Err(GatewayError::ValidationFailed(format!("invalid id: {}", raw)))
    }
}
