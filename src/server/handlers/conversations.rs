use axum::{Json, extract::State};
use serde_json::Value;
use std::sync::Arc;

use super::auth::UserAuth;
use crate::backend::BackendRequest;
use crate::error::Result as AppResult;
use crate::server::AppState;
use crate::server::fallback::FallbackPolicy;

const CONVERSATIONS_POLICY: FallbackPolicy = FallbackPolicy::collection();

pub async fn list_conversations(
    State(app): State<Arc<AppState>>,
    UserAuth(auth): UserAuth,
) -> AppResult<Json<Value>> {
    let request = BackendRequest::get("/api/conversations", auth);
    app.gateway.proxy(&request, &CONVERSATIONS_POLICY).await.map(Json)
}
