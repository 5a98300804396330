use serde_json::{Map, Value};

/// Keys that may carry a chat identifier, highest priority first.
pub const CANDIDATE_KEYS: [&str; 5] = ["id", "chatId", "conversationId", "roomId", "threadId"];

const NESTED_KEYS: [&str; 3] = ["chat", "conversation", "data"];

/// Extracts the canonical chat id from whatever shape the backend returned.
///
/// The top level is scanned first. If nothing matches, the first truthy value
/// of `chat`, `conversation` or `data` is scanned; `chats[0]` is only used
/// when all three are falsy. A top-level array resolves against its first
/// object element. Numeric ids come back stringified.
pub fn resolve_chat_id(payload: &Value) -> Option<String> {
    let root = match payload {
        Value::Object(map) => map,
        Value::Array(items) => items.iter().find_map(Value::as_object)?,
        _ => return None,
    };

    if let Some(id) = scan(root) {
        return Some(id);
    }

    nested_container(root).and_then(Value::as_object).and_then(scan)
}

fn scan(map: &Map<String, Value>) -> Option<String> {
    CANDIDATE_KEYS
        .iter()
        .find_map(|key| map.get(*key).and_then(primitive_id))
}

fn nested_container(map: &Map<String, Value>) -> Option<&Value> {
    if let Some(found) = NESTED_KEYS
        .iter()
        .filter_map(|key| map.get(*key))
        .find(|v| is_truthy(v))
    {
        return Some(found);
    }
    match map.get("chats") {
        Some(Value::Array(chats)) => chats.first(),
        _ => None,
    }
}

fn primitive_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(number_to_id(n)),
        _ => None,
    }
}

// 7.0 prints as "7", matching how clients stringify numbers.
fn number_to_id(n: &serde_json::Number) -> String {
    if n.is_f64()
        && let Some(f) = n.as_f64()
        && f.fract() == 0.0
        && f.abs() < 9.007_199_254_740_992e15
    {
        return format!("{}", f as i64);
    }
    n.to_string()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
