use axum::{
    Json,
    extract::{Path, RawQuery, State},
};
use serde_json::{Value, json};
use std::sync::Arc;

use super::auth::{TokenAuth, UserAuth};
use super::{JsonBody, require_field};
use crate::backend::BackendRequest;
use crate::error::{GatewayError, Result as AppResult};
use crate::server::AppState;
use crate::server::chat_id::resolve_chat_id;
use crate::server::fallback::{FallbackPolicy, UnreachablePolicy};
use crate::server::util::path_segment;

const CREATE_OR_FIND_POLICY: FallbackPolicy =
    FallbackPolicy::entity().when_unreachable(UnreachablePolicy::MockEntity);

const MESSAGES_POLICY: FallbackPolicy = FallbackPolicy::collection().propagate_errors();

const SEND_MESSAGE_POLICY: FallbackPolicy = FallbackPolicy::entity();

pub async fn create_or_find(
    State(app): State<Arc<AppState>>,
    UserAuth(auth): UserAuth,
    JsonBody(payload): JsonBody,
) -> AppResult<Json<Value>> {
    require_field(&payload, "participantId")?;

    let request = BackendRequest::post("/api/chat/create-or-find", auth, payload);
    let body = app.gateway.proxy(&request, &CREATE_OR_FIND_POLICY).await?;

    let Some(chat_id) = resolve_chat_id(&body) else {
        tracing::error!(body = %body, "create-or-find response carried no chat id");
        return Err(GatewayError::Internal(
            "chat id missing from backend response".into(),
        ));
    };
    Ok(Json(with_canonical_id(body, chat_id)))
}

// The canonical id always sits at the top level, whatever shape the backend used.
fn with_canonical_id(body: Value, chat_id: String) -> Value {
    match body {
        Value::Object(mut map) => {
            map.insert("id".into(), Value::String(chat_id));
            Value::Object(map)
        }
        other => json!({ "id": chat_id, "chat": other }),
    }
}

pub async fn list_messages(
    State(app): State<Arc<AppState>>,
    TokenAuth(auth): TokenAuth,
    Path(chat_id): Path<String>,
    RawQuery(query): RawQuery,
) -> AppResult<Json<Value>> {
    let chat_id = path_segment(&chat_id)?;

    let request = BackendRequest::get(format!("/api/chat/{}/messages", chat_id), auth)
        .with_query(query);
    app.gateway.proxy(&request, &MESSAGES_POLICY).await.map(Json)
}

pub async fn send_message(
    State(app): State<Arc<AppState>>,
    UserAuth(auth): UserAuth,
    Path(chat_id): Path<String>,
    JsonBody(payload): JsonBody,
) -> AppResult<Json<Value>> {
    let chat_id = path_segment(&chat_id)?;
    require_field(&payload, "content")?;

    let request = BackendRequest::post(format!("/api/chat/{}/messages", chat_id), auth, payload);
    app.gateway.proxy(&request, &SEND_MESSAGE_POLICY).await.map(Json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_id_overrides_nested_shape() {
        let body = json!({"success": true, "chat": {"_id": "x", "roomId": 5}});
        let out = with_canonical_id(body, "5".into());
        assert_eq!(out["id"], "5");
        assert_eq!(out["chat"]["roomId"], 5);
    }

    #[test]
    fn array_body_is_wrapped() {
        let out = with_canonical_id(json!([{"id": 3}]), "3".into());
        assert_eq!(out["id"], "3");
        assert_eq!(out["chat"][0]["id"], 3);
    }
}
