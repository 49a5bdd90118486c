//! GraphQL authentication context
//!
//! The transport stores the caller's raw `authorization` value as
//! [`Credentials`] in the request (HTTP) or connection (WebSocket) data.
//! Resolvers hand it to the service layer, which verifies it per operation,
//! so an invalid token is reported the same way on every transport.

use std::sync::Arc;

use async_graphql::Context;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

use crate::services::BlogService;

/// Raw authorization value supplied by the client, unverified
#[derive(Debug, Clone, Default)]
pub struct Credentials(pub Option<String>);

impl Credentials {
    pub fn new(value: Option<String>) -> Self {
        Self(value)
    }

    /// Read the `authorization` HTTP header
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self(
            headers
                .get(AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .map(str::to_string),
        )
    }

    /// Read `Authorization`/`authorization` from a WebSocket `connection_init` payload
    pub fn from_connection_params(params: &serde_json::Value) -> Self {
        Self(
            params
                .get("Authorization")
                .or_else(|| params.get("authorization"))
                .and_then(|v| v.as_str())
                .map(str::to_string),
        )
    }

    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_present(&self) -> bool {
        self.0.as_deref().is_some_and(|v| !v.trim().is_empty())
    }
}

/// Extension trait to reach the blog service and caller credentials
pub trait AuthExt {
    /// The caller's raw authorization value, if any
    fn credentials(&self) -> Option<&str>;

    fn blog(&self) -> &Arc<BlogService>;
}

impl<'a> AuthExt for Context<'a> {
    fn credentials(&self) -> Option<&str> {
        self.data_opt::<Credentials>().and_then(Credentials::as_deref)
    }

    fn blog(&self) -> &Arc<BlogService> {
        self.data_unchecked::<Arc<BlogService>>()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use serde_json::json;

    use super::*;

    #[test]
    fn header_value_is_kept_raw() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(Credentials::from_headers(&headers).as_deref(), Some("Bearer abc"));
        assert!(!Credentials::from_headers(&HeaderMap::new()).is_present());
    }

    #[test]
    fn connection_params_accept_either_case() {
        let upper = Credentials::from_connection_params(&json!({ "Authorization": "Bearer a" }));
        let lower = Credentials::from_connection_params(&json!({ "authorization": "Bearer b" }));
        let none = Credentials::from_connection_params(&json!({}));

        assert_eq!(upper.as_deref(), Some("Bearer a"));
        assert_eq!(lower.as_deref(), Some("Bearer b"));
        assert!(!none.is_present());
    }
}
