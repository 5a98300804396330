use axum::{
    Json, Router,
    extract::{FromRequest, Request, State},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::error::GatewayError;
use crate::server::AppState;

mod auth;
mod chat;
mod conversations;
mod posts;
mod session;
mod stories;
mod users;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        // Session
        .route("/api/auth/login", post(session::login))
        .route("/api/auth/logout", post(session::logout))
        // Chat
        .route("/api/conversations", get(conversations::list_conversations))
        .route("/api/chat/create-or-find", post(chat::create_or_find))
        .route(
            "/api/chat/{chat_id}/messages",
            get(chat::list_messages).post(chat::send_message),
        )
        // Feed
        .route("/api/posts", get(posts::list_posts).post(posts::create_post))
        .route("/api/posts/{post_id}/like", post(posts::like_post))
        .route(
            "/api/stories",
            get(stories::list_stories).post(stories::create_story),
        )
        // Profiles
        .route(
            "/api/users/{user_id}",
            get(users::get_profile).put(users::update_profile),
        )
}

async fn health(State(app): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "mockFallback": app.config.fallback.mock_entities,
    }))
}

/// JSON request body. Missing content type or unparsable JSON is a 400
/// in the gateway's own error shape.
pub(crate) struct JsonBody(pub Value);

impl<S: Send + Sync> FromRequest<S> for JsonBody {
    type Rejection = GatewayError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<Value>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(GatewayError::ValidationFailed(rejection.body_text())),
        }
    }
}

/// Rejects bodies where `field` is absent, null or an empty string.
pub(crate) fn require_field(payload: &Value, field: &str) -> Result<(), GatewayError> {
    let present = match payload.get(field) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    };
    if present {
        Ok(())
    } else {
        Err(GatewayError::ValidationFailed(format!("{} is required", field)))
    }
}
