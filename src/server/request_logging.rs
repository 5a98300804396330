use chrono::{DateTime, Utc};

use crate::backend::BackendRequest;
use crate::server::util::mask_token;

// 记录一次代理请求（耗时、后端状态、最终返回码）
pub fn log_proxy_request(
    request: &BackendRequest,
    start_time: DateTime<Utc>,
    outcome: &str,
    backend_status: Option<u16>,
    status_code: u16,
) {
    let response_time_ms = (Utc::now() - start_time).num_milliseconds();
    let token = request.auth.token.as_deref().map(mask_token);

    tracing::info!(
        method = %request.method,
        path = %request.path,
        outcome,
        backend_status,
        status_code,
        response_time_ms,
        user_id = request.auth.user_id.as_deref(),
        token = token.as_deref(),
        "proxied request"
    );
}
