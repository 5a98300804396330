use axum::{
    Json,
    extract::{Path, State},
    http::Method,
};
use serde_json::Value;
use std::sync::Arc;

use super::JsonBody;
use super::auth::{TokenAuth, UserAuth};
use crate::backend::BackendRequest;
use crate::error::{GatewayError, Result as AppResult};
use crate::server::AppState;
use crate::server::fallback::FallbackPolicy;
use crate::server::util::path_segment;

const PROFILE_POLICY: FallbackPolicy = FallbackPolicy::entity();

pub async fn get_profile(
    State(app): State<Arc<AppState>>,
    TokenAuth(auth): TokenAuth,
    Path(user_id): Path<String>,
) -> AppResult<Json<Value>> {
    let user_id = path_segment(&user_id)?;

    let request = BackendRequest::get(format!("/api/users/{}", user_id), auth);
    app.gateway.proxy(&request, &PROFILE_POLICY).await.map(Json)
}

pub async fn update_profile(
    State(app): State<Arc<AppState>>,
    UserAuth(auth): UserAuth,
    Path(user_id): Path<String>,
    JsonBody(payload): JsonBody,
) -> AppResult<Json<Value>> {
    let user_id = path_segment(&user_id)?;
    if !payload.is_object() {
        return Err(GatewayError::ValidationFailed(
            "profile update must be a JSON object".into(),
        ));
    }

    let request = BackendRequest::new(Method::PUT, format!("/api/users/{}", user_id), auth)
        .with_body(payload);
    app.gateway.proxy(&request, &PROFILE_POLICY).await.map(Json)
}
