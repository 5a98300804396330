use axum::{
    Json,
    extract::State,
    http::{HeaderValue, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use std::sync::Arc;

use super::JsonBody;
use super::auth::TOKEN_COOKIE;
use crate::backend::{AuthContext, BackendRequest};
use crate::error::{GatewayError, Result as AppResult};
use crate::server::AppState;
use crate::server::fallback::FallbackPolicy;

const ONE_YEAR_SECS: u64 = 365 * 24 * 60 * 60;

const LOGIN_POLICY: FallbackPolicy = FallbackPolicy::entity();

// Readable from the browser: the client attaches it as a bearer token itself.
fn set_token_cookie(token: &str) -> Result<HeaderValue, GatewayError> {
    HeaderValue::from_str(&format!(
        "{}={}; Path=/; Max-Age={}; SameSite=Lax",
        TOKEN_COOKIE, token, ONE_YEAR_SECS
    ))
    .map_err(|_| GatewayError::Internal("token contains invalid header characters".into()))
}

fn clear_token_cookie() -> HeaderValue {
    HeaderValue::from_static("token=; Path=/; Max-Age=0; SameSite=Lax")
}

fn token_from_login(body: &Value) -> Option<&str> {
    ["token", "accessToken"]
        .iter()
        .find_map(|k| body.get(*k).and_then(Value::as_str))
        .or_else(|| body.get("data").and_then(|d| d.get("token")).and_then(Value::as_str))
        .filter(|t| !t.trim().is_empty())
}

pub async fn login(
    State(app): State<Arc<AppState>>,
    JsonBody(payload): JsonBody,
) -> AppResult<Response> {
    let request = BackendRequest::post("/api/auth/login", AuthContext::default(), payload);
    let body = app.gateway.proxy(&request, &LOGIN_POLICY).await?;

    let cookie = token_from_login(&body).map(set_token_cookie).transpose()?;
    let mut resp = Json(body).into_response();
    match cookie {
        Some(value) => {
            resp.headers_mut().insert(SET_COOKIE, value);
            tracing::info!("login succeeded, token cookie issued");
        }
        None => tracing::warn!("login response carried no token"),
    }
    Ok(resp)
}

pub async fn logout() -> impl IntoResponse {
    let mut resp = StatusCode::NO_CONTENT.into_response();
    resp.headers_mut().insert(SET_COOKIE, clear_token_cookie());
    resp
}
