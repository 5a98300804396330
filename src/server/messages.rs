// 已知后端错误文案 → 面向用户的提示；未知文案原样透传
const KNOWN_BACKEND_ERRORS: &[(&str, &str)] = &[
    ("jwt expired", "Your session has expired. Please sign in again."),
    ("token expired", "Your session has expired. Please sign in again."),
    ("jwt malformed", "Your session is invalid. Please sign in again."),
    ("invalid token", "Your session is invalid. Please sign in again."),
    ("user not found", "This user could not be found."),
    ("chat not found", "This conversation no longer exists."),
    ("conversation not found", "This conversation no longer exists."),
    ("post not found", "This post no longer exists."),
    ("already exists", "This item already exists."),
    ("too many requests", "You are doing that too often. Please wait a moment."),
];

/// Turns a backend error body into the text shown to the client.
pub fn user_facing_message(status: u16, raw: &str) -> String {
    let message = extract_message(raw);
    let lower = message.to_ascii_lowercase();

    if let Some((_, friendly)) = KNOWN_BACKEND_ERRORS
        .iter()
        .find(|(needle, _)| lower.contains(needle))
    {
        return friendly.to_string();
    }

    if message.trim().is_empty() {
        return default_for_status(status).to_string();
    }
    message
}

// Backends usually answer `{"message": ".."}` or `{"error": ".."}`; plain text is kept as is.
fn extract_message(raw: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(raw) {
        for key in ["message", "error", "msg"] {
            if let Some(serde_json::Value::String(s)) = map.get(key) {
                return s.clone();
            }
        }
    }
    raw.to_string()
}

fn default_for_status(status: u16) -> &'static str {
    match status {
        400 => "The request was rejected by the server.",
        401 | 403 => "You are not allowed to do that.",
        404 => "Not found.",
        409 => "This item already exists.",
        429 => "You are doing that too often. Please wait a moment.",
        _ => "Something went wrong. Please try again.",
    }
}
