use chrono::Utc;
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::backend::BackendRequest;

pub const FALLBACK_MESSAGE: &str = "Backend unavailable; created a local placeholder";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundPolicy {
    /// Answer 200 with `[]`.
    EmptyArray,
    Propagate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    Propagate,
    /// Mask any non-404 backend error as `[]`.
    EmptyArray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnreachablePolicy {
    EmptyArray,
    MockEntity,
    /// 500 with a generic message.
    Propagate,
}

/// Per-route rule for backend failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackPolicy {
    pub on_not_found: NotFoundPolicy,
    pub on_error: ErrorPolicy,
    pub on_unreachable: UnreachablePolicy,
    pub expects_array: bool,
}

impl FallbackPolicy {
    /// Listing routes: every failure degrades to an empty list.
    pub const fn collection() -> Self {
        Self {
            on_not_found: NotFoundPolicy::EmptyArray,
            on_error: ErrorPolicy::EmptyArray,
            on_unreachable: UnreachablePolicy::EmptyArray,
            expects_array: true,
        }
    }

    /// Single-entity routes: every failure reaches the client.
    pub const fn entity() -> Self {
        Self {
            on_not_found: NotFoundPolicy::Propagate,
            on_error: ErrorPolicy::Propagate,
            on_unreachable: UnreachablePolicy::Propagate,
            expects_array: false,
        }
    }

    pub const fn propagate_errors(mut self) -> Self {
        self.on_error = ErrorPolicy::Propagate;
        self
    }

    pub const fn when_unreachable(mut self, policy: UnreachablePolicy) -> Self {
        self.on_unreachable = policy;
        self
    }
}

/// Builds the placeholder returned when a mock-entity route cannot reach the backend.
/// Request body fields are echoed back so the client sees the shape it asked for.
pub fn synthesize_entity(request: &BackendRequest) -> Value {
    let mut entity = match &request.body {
        Some(Value::Object(body)) => body.clone(),
        _ => Map::new(),
    };
    entity.insert("id".into(), json!(format!("local-{}", Uuid::new_v4())));
    if let Some(user_id) = &request.auth.user_id {
        entity
            .entry("userId")
            .or_insert_with(|| json!(user_id));
    }
    entity.insert("message".into(), json!(FALLBACK_MESSAGE));
    entity.insert("fallback".into(), json!(true));
    entity.insert("createdAt".into(), json!(Utc::now().to_rfc3339()));
    Value::Object(entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::AuthContext;

    fn create_chat_request() -> BackendRequest {
        BackendRequest::post(
            "/api/chat/create-or-find",
            AuthContext {
                token: Some("t".into()),
                user_id: Some("7".into()),
            },
            json!({"participantId": 42}),
        )
    }

    #[test]
    fn entity_echoes_body_and_gets_fresh_id() {
        let req = create_chat_request();
        let a = synthesize_entity(&req);
        let b = synthesize_entity(&req);

        assert_eq!(a["participantId"], 42);
        assert_eq!(a["userId"], "7");
        assert_eq!(a["fallback"], true);
        assert_eq!(a["message"], FALLBACK_MESSAGE);
        let id = a["id"].as_str().unwrap();
        assert!(!id.trim().is_empty());
        assert_ne!(a["id"], b["id"]);
    }

    #[test]
    fn body_id_is_replaced() {
        let mut req = create_chat_request();
        req.body = Some(json!({"id": "client-supplied", "userId": "99"}));
        let entity = synthesize_entity(&req);
        assert_ne!(entity["id"], "client-supplied");
        assert_eq!(entity["userId"], "99");
    }

    #[test]
    fn preset_policies() {
        let c = FallbackPolicy::collection();
        assert!(c.expects_array);
        assert_eq!(c.on_not_found, NotFoundPolicy::EmptyArray);

        let e = FallbackPolicy::entity().when_unreachable(UnreachablePolicy::MockEntity);
        assert!(!e.expects_array);
        assert_eq!(e.on_unreachable, UnreachablePolicy::MockEntity);
        assert_eq!(e.on_not_found, NotFoundPolicy::Propagate);
    }
}
