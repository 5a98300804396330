use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

use super::{BackendRequest, BackendTransport, BoxFuture, RawResponse};
use crate::error::GatewayError;
use crate::http_client::client_for_url_with_timeout;

pub const USER_ID_HEADER: &str = "user-id";

/// The single outbound connection handle. Built once at startup and shared via `AppState`.
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let client = client_for_url_with_timeout(base_url, timeout)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn execute(&self, request: &BackendRequest) -> Result<RawResponse, reqwest::Error> {
        let url = request.url(&self.base_url);

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = &request.auth.token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(user_id) = &request.auth.user_id {
            builder = builder.header(USER_ID_HEADER, user_id);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(RawResponse { status, body })
    }
}

impl BackendTransport for HttpBackend {
    fn send<'a>(&'a self, request: &'a BackendRequest) -> BoxFuture<'a, Result<RawResponse, String>> {
        Box::pin(async move {
            self.execute(request).await.map_err(|e| {
                if e.is_timeout() {
                    format!("timeout calling {} {}", request.method, request.path)
                } else if e.is_connect() {
                    format!("cannot connect to backend: {}", e)
                } else {
                    e.to_string()
                }
            })
        })
    }
}
