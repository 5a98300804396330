pub mod chat_id;
pub mod fallback;
pub mod handlers;
pub mod messages;
pub mod proxy;
pub(crate) mod request_logging;
pub(crate) mod util;

use crate::backend::{BackendTransport, HttpBackend, USER_ID_HEADER};
use crate::config::Settings;
use crate::error::{GatewayError, Result as AppResult};
use crate::http_client::validate_base_url;
use crate::server::proxy::Gateway;
use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use axum::response::{IntoResponse, Response};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: Settings,
    pub gateway: Arc<Gateway>,
}

pub fn create_app(config: Settings) -> AppResult<Router> {
    let base_url = validate_base_url(&config.backend.base_url)?;
    let timeout = Duration::from_secs(config.backend.timeout_secs.max(1));
    let backend = HttpBackend::new(&base_url, timeout)?;
    tracing::info!(
        backend = %base_url,
        timeout_secs = timeout.as_secs(),
        mock_fallback = config.fallback.mock_entities,
        "Backend client ready"
    );

    Ok(build_router(config, Arc::new(backend)))
}

pub fn build_router(config: Settings, transport: Arc<dyn BackendTransport>) -> Router {
    let gateway = Arc::new(Gateway::new(transport, config.fallback.mock_entities));
    let app_state = AppState { config, gateway };

    // CORS（反射请求来源，允许携带 Cookie）
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(USER_ID_HEADER),
        ])
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true);

    handlers::routes()
        .with_state(Arc::new(app_state))
        // Proxied data is per-user and must never be served from a cache.
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::EXPIRES,
            HeaderValue::from_static("0"),
        ))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| err.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "unknown panic".to_string());
    GatewayError::Internal(format!("handler panicked: {}", detail)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn invalid_backend_url_fails_startup() {
        let mut config = Settings::default();
        config.backend.base_url = "localhost:5000".into();
        assert!(create_app(config).is_err());
    }

    #[test]
    fn panic_becomes_generic_500() {
        let resp = panic_response(Box::new("boom"));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
