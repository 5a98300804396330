use chrono::Utc;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::backend::{BackendRequest, BackendTransport, RawResponse};
use crate::error::GatewayError;
use crate::server::fallback::{
    ErrorPolicy, FallbackPolicy, NotFoundPolicy, UnreachablePolicy, synthesize_entity,
};
use crate::server::request_logging::log_proxy_request;

#[derive(Debug, Clone, PartialEq)]
pub enum BackendResult {
    /// `status` is what the backend answered; a non-2xx value means the body
    /// is a policy fallback standing in for an error.
    Success { status: u16, body: Value },
    BackendError { status: u16, message: String },
    BackendUnreachable { cause: String },
}

impl BackendResult {
    fn label(&self) -> &'static str {
        match self {
            BackendResult::Success { status, .. } if !(200..300).contains(status) => "masked",
            BackendResult::Success { .. } => "success",
            BackendResult::BackendError { .. } => "backend_error",
            BackendResult::BackendUnreachable { .. } => "unreachable",
        }
    }

    pub fn backend_status(&self) -> Option<u16> {
        match self {
            BackendResult::Success { status, .. } | BackendResult::BackendError { status, .. } => {
                Some(*status)
            }
            BackendResult::BackendUnreachable { .. } => None,
        }
    }
}

/// Forwards inbound calls to the backend and applies each route's fallback policy.
/// Holds no per-request state; one instance serves every request concurrently.
pub struct Gateway {
    transport: Arc<dyn BackendTransport>,
    mock_entities: bool,
}

impl Gateway {
    pub fn new(transport: Arc<dyn BackendTransport>, mock_entities: bool) -> Self {
        Self {
            transport,
            mock_entities,
        }
    }

    /// One attempt, no retry. Classifies the outcome and applies the 404/error
    /// parts of `policy`; unreachable backends are left to [`Gateway::settle`].
    pub async fn forward(&self, request: &BackendRequest, policy: &FallbackPolicy) -> BackendResult {
        match self.transport.send(request).await {
            Ok(raw) => classify(raw, request, policy),
            Err(cause) => {
                tracing::warn!(
                    method = %request.method,
                    path = %request.path,
                    cause = %cause,
                    "backend unreachable"
                );
                BackendResult::BackendUnreachable { cause }
            }
        }
    }

    pub fn settle(
        &self,
        result: BackendResult,
        request: &BackendRequest,
        policy: &FallbackPolicy,
    ) -> Result<Value, GatewayError> {
        match result {
            BackendResult::Success { body, .. } => Ok(body),
            BackendResult::BackendError { status, message } => {
                Err(GatewayError::Backend { status, message })
            }
            BackendResult::BackendUnreachable { cause } => match policy.on_unreachable {
                UnreachablePolicy::EmptyArray => {
                    tracing::info!(path = %request.path, "fallback: empty collection");
                    Ok(json!([]))
                }
                UnreachablePolicy::MockEntity if self.mock_entities => {
                    tracing::info!(path = %request.path, "fallback: synthesized entity");
                    Ok(synthesize_entity(request))
                }
                _ => Err(GatewayError::BackendUnreachable(cause)),
            },
        }
    }

    pub async fn proxy(
        &self,
        request: &BackendRequest,
        policy: &FallbackPolicy,
    ) -> Result<Value, GatewayError> {
        let start_time = Utc::now();
        let result = self.forward(request, policy).await;
        let outcome = result.label();
        let backend_status = result.backend_status();

        let settled = self.settle(result, request, policy);
        let status = match &settled {
            Ok(_) => 200,
            Err(e) => e.status_code().as_u16(),
        };
        log_proxy_request(request, start_time, outcome, backend_status, status);
        settled
    }
}

fn classify(raw: RawResponse, request: &BackendRequest, policy: &FallbackPolicy) -> BackendResult {
    let RawResponse { status, body } = raw;

    if (200..300).contains(&status) {
        return BackendResult::Success {
            status,
            body: decode_body(&body, policy.expects_array),
        };
    }

    if status == 404 && policy.on_not_found == NotFoundPolicy::EmptyArray {
        tracing::info!(
            method = %request.method,
            path = %request.path,
            "fallback: not found as empty collection"
        );
        return BackendResult::Success {
            status,
            body: json!([]),
        };
    }

    if status != 404 && policy.on_error == ErrorPolicy::EmptyArray {
        tracing::info!(
            method = %request.method,
            path = %request.path,
            status,
            "fallback: masking backend error as empty collection"
        );
        return BackendResult::Success {
            status,
            body: json!([]),
        };
    }

    BackendResult::BackendError {
        status,
        message: body,
    }
}

// Undecodable bodies are passed on as a JSON string rather than dropped.
fn decode_body(body: &str, expects_array: bool) -> Value {
    let decoded = if body.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
    };

    if expects_array && !decoded.is_array() {
        return json!([]);
    }
    decoded
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::backend::{AuthContext, BoxFuture};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls and replays a fixed reply.
    pub(crate) struct SpyTransport {
        calls: AtomicUsize,
        reply: Result<RawResponse, String>,
        last: Mutex<Option<BackendRequest>>,
    }

    impl SpyTransport {
        pub(crate) fn replying(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                reply: Ok(RawResponse {
                    status,
                    body: body.to_string(),
                }),
                last: Mutex::new(None),
            })
        }

        pub(crate) fn unreachable() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                reply: Err("connection refused".to_string()),
                last: Mutex::new(None),
            })
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub(crate) fn last_request(&self) -> Option<BackendRequest> {
            self.last.lock().unwrap().clone()
        }
    }

    impl BackendTransport for SpyTransport {
        fn send<'a>(
            &'a self,
            request: &'a BackendRequest,
        ) -> BoxFuture<'a, Result<RawResponse, String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(request.clone());
            let reply = self.reply.clone();
            Box::pin(async move { reply })
        }
    }

    fn request() -> BackendRequest {
        BackendRequest::get(
            "/api/conversations",
            AuthContext {
                token: Some("t".into()),
                user_id: Some("7".into()),
            },
        )
    }

    #[tokio::test]
    async fn success_body_is_returned_verbatim() {
        let spy = SpyTransport::replying(200, r#"{"id":"p1","likes":[1,2]}"#);
        let gw = Gateway::new(spy.clone(), true);
        let body = gw.proxy(&request(), &FallbackPolicy::entity()).await.unwrap();
        assert_eq!(body, json!({"id": "p1", "likes": [1, 2]}));
        assert_eq!(spy.calls(), 1);
    }

    #[tokio::test]
    async fn non_array_is_normalized_when_array_expected() {
        let spy = SpyTransport::replying(200, r#"{"conversations":[]}"#);
        let gw = Gateway::new(spy, true);
        let body = gw
            .proxy(&request(), &FallbackPolicy::collection())
            .await
            .unwrap();
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn not_found_follows_route_policy() {
        let spy = SpyTransport::replying(404, "Not Found");
        let gw = Gateway::new(spy.clone(), true);

        let result = gw.forward(&request(), &FallbackPolicy::collection()).await;
        assert_eq!(
            result,
            BackendResult::Success {
                status: 404,
                body: json!([])
            }
        );
        assert_eq!(result.backend_status(), Some(404));

        let err = gw
            .proxy(&request(), &FallbackPolicy::entity())
            .await
            .unwrap_err();
        assert_eq!(err.status_code().as_u16(), 404);
    }

    #[tokio::test]
    async fn backend_error_keeps_status_and_text() {
        let spy = SpyTransport::replying(503, "maintenance window");
        let gw = Gateway::new(spy, true);

        let result = gw.forward(&request(), &FallbackPolicy::entity()).await;
        assert_eq!(
            result,
            BackendResult::BackendError {
                status: 503,
                message: "maintenance window".into()
            }
        );
    }

    #[tokio::test]
    async fn masked_error_keeps_backend_status_for_logging() {
        let spy = SpyTransport::replying(500, "boom");
        let gw = Gateway::new(spy, true);

        let result = gw.forward(&request(), &FallbackPolicy::collection()).await;
        assert_eq!(result.backend_status(), Some(500));
        assert_eq!(result.label(), "masked");
        assert_eq!(
            gw.settle(result, &request(), &FallbackPolicy::collection())
                .unwrap(),
            json!([])
        );

        let ok = BackendResult::Success {
            status: 201,
            body: json!({}),
        };
        assert_eq!(ok.label(), "success");
        assert_eq!(
            BackendResult::BackendUnreachable {
                cause: "refused".into()
            }
            .backend_status(),
            None
        );
    }

    #[tokio::test]
    async fn backend_error_masked_for_collections() {
        let spy = SpyTransport::replying(500, "boom");
        let gw = Gateway::new(spy, true);
        let body = gw
            .proxy(&request(), &FallbackPolicy::collection())
            .await
            .unwrap();
        assert_eq!(body, json!([]));

        let spy = SpyTransport::replying(500, "boom");
        let gw = Gateway::new(spy, true);
        let err = gw
            .proxy(&request(), &FallbackPolicy::collection().propagate_errors())
            .await
            .unwrap_err();
        assert_eq!(err.status_code().as_u16(), 500);
    }

    #[tokio::test]
    async fn unreachable_policies() {
        let gw = Gateway::new(SpyTransport::unreachable(), true);

        let empty = gw
            .proxy(&request(), &FallbackPolicy::collection())
            .await
            .unwrap();
        assert_eq!(empty, json!([]));

        let err = gw
            .proxy(&request(), &FallbackPolicy::entity())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::BackendUnreachable(_)));
        assert_eq!(err.status_code().as_u16(), 500);

        let mock = gw
            .proxy(
                &request(),
                &FallbackPolicy::entity().when_unreachable(UnreachablePolicy::MockEntity),
            )
            .await
            .unwrap();
        assert!(mock["id"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[tokio::test]
    async fn mock_entities_can_be_disabled() {
        let gw = Gateway::new(SpyTransport::unreachable(), false);
        let err = gw
            .proxy(
                &request(),
                &FallbackPolicy::entity().when_unreachable(UnreachablePolicy::MockEntity),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::BackendUnreachable(_)));
    }

    #[test]
    fn empty_and_invalid_bodies() {
        assert_eq!(decode_body("", false), Value::Null);
        assert_eq!(decode_body("", true), json!([]));
        assert_eq!(decode_body("ok", false), json!("ok"));
        assert_eq!(decode_body("[1]", true), json!([1]));
    }
}
