use axum::{
    Json,
    extract::{Path, RawQuery, State},
};
use serde_json::{Value, json};
use std::sync::Arc;

use super::auth::{TokenAuth, UserAuth};
use super::{JsonBody, require_field};
use crate::backend::BackendRequest;
use crate::error::Result as AppResult;
use crate::server::AppState;
use crate::server::fallback::FallbackPolicy;
use crate::server::util::path_segment;

const FEED_POLICY: FallbackPolicy = FallbackPolicy::collection();
const WRITE_POLICY: FallbackPolicy = FallbackPolicy::entity();

pub async fn list_posts(
    State(app): State<Arc<AppState>>,
    TokenAuth(auth): TokenAuth,
    RawQuery(query): RawQuery,
) -> AppResult<Json<Value>> {
    let request = BackendRequest::get("/api/posts", auth).with_query(query);
    app.gateway.proxy(&request, &FEED_POLICY).await.map(Json)
}

pub async fn create_post(
    State(app): State<Arc<AppState>>,
    UserAuth(auth): UserAuth,
    JsonBody(payload): JsonBody,
) -> AppResult<Json<Value>> {
    require_field(&payload, "content")?;

    let request = BackendRequest::post("/api/posts", auth, payload);
    app.gateway.proxy(&request, &WRITE_POLICY).await.map(Json)
}

pub async fn like_post(
    State(app): State<Arc<AppState>>,
    UserAuth(auth): UserAuth,
    Path(post_id): Path<String>,
) -> AppResult<Json<Value>> {
    let post_id = path_segment(&post_id)?;

    let request = BackendRequest::post(format!("/api/posts/{}/like", post_id), auth, json!({}));
    app.gateway.proxy(&request, &WRITE_POLICY).await.map(Json)
}
