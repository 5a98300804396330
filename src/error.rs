use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::server::messages::user_facing_message;

pub const GENERIC_UNAVAILABLE: &str = "Backend service is unavailable";
pub const GENERIC_INTERNAL: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("authentication required")]
    AuthMissing,

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("backend unreachable: {0}")]
    BackendUnreachable(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::AuthMissing => StatusCode::UNAUTHORIZED,
            GatewayError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            GatewayError::Backend { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Only the first three variants carry text that is safe to hand back to a client.
    fn client_message(&self) -> String {
        match self {
            GatewayError::AuthMissing => "Unauthorized".to_string(),
            GatewayError::ValidationFailed(msg) => msg.clone(),
            GatewayError::Backend { status, message } => user_facing_message(*status, message),
            GatewayError::BackendUnreachable(_) => GENERIC_UNAVAILABLE.to_string(),
            _ => GENERIC_INTERNAL.to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }
        let body = match &self {
            GatewayError::Backend { message, .. } => serde_json::json!({
                "error": self.client_message(),
                "details": message,
            }),
            _ => serde_json::json!({ "error": self.client_message() }),
        };
        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
