use axum::{Json, extract::State};
use serde_json::Value;
use std::sync::Arc;

use super::auth::{TokenAuth, UserAuth};
use super::{JsonBody, require_field};
use crate::backend::BackendRequest;
use crate::error::Result as AppResult;
use crate::server::AppState;
use crate::server::fallback::FallbackPolicy;

pub async fn list_stories(
    State(app): State<Arc<AppState>>,
    TokenAuth(auth): TokenAuth,
) -> AppResult<Json<Value>> {
    let request = BackendRequest::get("/api/stories", auth);
    app.gateway
        .proxy(&request, &FallbackPolicy::collection())
        .await
        .map(Json)
}

pub async fn create_story(
    State(app): State<Arc<AppState>>,
    UserAuth(auth): UserAuth,
    JsonBody(payload): JsonBody,
) -> AppResult<Json<Value>> {
    require_field(&payload, "mediaUrl")?;

    let request = BackendRequest::post("/api/stories", auth, payload);
    app.gateway
        .proxy(&request, &FallbackPolicy::entity())
        .await
        .map(Json)
}
