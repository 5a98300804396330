mod client;

pub use client::{HttpBackend, USER_ID_HEADER};

use std::future::Future;
use std::pin::Pin;

use reqwest::Method;
use serde_json::Value;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Credentials forwarded to the backend. Built from the inbound request headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    pub token: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BackendRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub auth: AuthContext,
    pub body: Option<Value>,
}

impl BackendRequest {
    pub fn new(method: Method, path: impl Into<String>, auth: AuthContext) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            auth,
            body: None,
        }
    }

    pub fn get(path: impl Into<String>, auth: AuthContext) -> Self {
        Self::new(Method::GET, path, auth)
    }

    pub fn post(path: impl Into<String>, auth: AuthContext, body: Value) -> Self {
        Self::new(Method::POST, path, auth).with_body(body)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, query: Option<String>) -> Self {
        self.query = query.filter(|q| !q.is_empty());
        self
    }

    pub fn url(&self, base_url: &str) -> String {
        let mut url = format!("{}{}", base_url.trim_end_matches('/'), self.path);
        if let Some(q) = &self.query {
            url.push('?');
            url.push_str(q);
        }
        url
    }
}

/// Status and undecoded body of a completed backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

// 后端传输抽象：生产环境走 reqwest，测试中可替换为计数桩
pub trait BackendTransport: Send + Sync {
    /// `Err` carries the cause of a call that never produced an HTTP response.
    fn send<'a>(&'a self, request: &'a BackendRequest) -> BoxFuture<'a, Result<RawResponse, String>>;
}
