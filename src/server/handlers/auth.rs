use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};

use crate::backend::{AuthContext, USER_ID_HEADER};
use crate::error::GatewayError;
use crate::server::util::{bearer_token, cookie_value, header_value};

pub const TOKEN_COOKIE: &str = "token";

/// Token from `Authorization: Bearer`, falling back to the `token` cookie.
pub fn auth_context(headers: &HeaderMap) -> AuthContext {
    AuthContext {
        token: bearer_token(headers).or_else(|| cookie_value(headers, TOKEN_COOKIE)),
        user_id: header_value(headers, USER_ID_HEADER),
    }
}

pub fn require_token(headers: &HeaderMap) -> Result<AuthContext, GatewayError> {
    let auth = auth_context(headers);
    if auth.token.is_none() {
        return Err(GatewayError::AuthMissing);
    }
    Ok(auth)
}

// User-scoped routes need both the token and the `user-id` header.
pub fn require_user(headers: &HeaderMap) -> Result<AuthContext, GatewayError> {
    let auth = require_token(headers)?;
    if auth.user_id.is_none() {
        return Err(GatewayError::AuthMissing);
    }
    Ok(auth)
}

/// Extractor for routes that only need a token. Runs before any body extractor,
/// so a missing token is always reported as 401.
pub struct TokenAuth(pub AuthContext);

/// Extractor for user-scoped routes: token plus `user-id`.
pub struct UserAuth(pub AuthContext);

impl<S: Send + Sync> FromRequestParts<S> for TokenAuth {
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require_token(&parts.headers).map(TokenAuth)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for UserAuth {
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require_user(&parts.headers).map(UserAuth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, header};

    #[test]
    fn bearer_preferred_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        headers.insert(header::COOKIE, HeaderValue::from_static("token=from-cookie"));
        assert_eq!(auth_context(&headers).token.as_deref(), Some("from-header"));
    }

    #[test]
    fn cookie_alone_is_enough_for_token_routes() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("token=from-cookie"));
        let auth = require_token(&headers).unwrap();
        assert_eq!(auth.token.as_deref(), Some("from-cookie"));
        assert!(matches!(require_user(&headers), Err(GatewayError::AuthMissing)));
    }

    #[test]
    fn user_routes_need_user_id() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer t"));
        headers.insert(USER_ID_HEADER, HeaderValue::from_static(" 7 "));
        let auth = require_user(&headers).unwrap();
        assert_eq!(auth.user_id.as_deref(), Some("7"));
    }

    #[test]
    fn nothing_is_auth_missing() {
        let headers = HeaderMap::new();
        assert!(matches!(require_token(&headers), Err(GatewayError::AuthMissing)));
    }
}
