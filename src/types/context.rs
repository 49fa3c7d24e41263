//! Per-request context threaded through the handler chain
//!
//! A context is an immutable value: gate stages that learn something about
//! the request (the authenticated user) produce a new context rather than
//! mutating the one they were given.

use bytes::Bytes;
use hyper::header::{HeaderMap, HeaderName, HeaderValue, COOKIE};
use hyper::Method;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

use crate::auth::AuthUser;
use crate::types::{FaqError, Result};

/// Maximum accepted request body size
pub const MAX_BODY_BYTES: usize = 10240;

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
    params: HashMap<&'static str, String>,
    user: Option<AuthUser>,
}

impl RequestContext {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            request_id: String::new(),
            method,
            path: path.into(),
            query: None,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            params: HashMap::new(),
            user: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    pub fn with_query(mut self, query: Option<&str>) -> Self {
        self.query = query.map(str::to_string);
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Add a single header; invalid names or values are ignored
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.params.insert(name, value.into());
        self
    }

    /// Context for the same request, now carrying a verified identity
    pub fn with_user(self, user: AuthUser) -> Self {
        Self {
            user: Some(user),
            ..self
        }
    }

    pub fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Every `Cookie` header line joined with `; `, skipping non-UTF-8 values
    pub fn cookie_header(&self) -> Option<String> {
        let values: Vec<&str> = self
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();

        if values.is_empty() {
            None
        } else {
            Some(values.join("; "))
        }
    }

    /// Decode the query string into a typed value
    pub fn query_as<T: DeserializeOwned>(&self) -> Result<T> {
        serde_urlencoded::from_str(self.query.as_deref().unwrap_or(""))
            .map_err(|e| FaqError::BadRequest(format!("Invalid query: {}", e)))
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        if self.body.len() > MAX_BODY_BYTES {
            return Err(FaqError::Http("Request body too large".into()));
        }

        serde_json::from_slice(&self.body)
            .map_err(|e| FaqError::Http(format!("Invalid JSON: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use serde::Deserialize;

    #[test]
    fn test_with_user_leaves_original_untouched() {
        let ctx = RequestContext::new(Method::GET, "/api/auth/me");
        let authed = ctx
            .clone()
            .with_user(AuthUser::new("u1", "u1@example.com", Role::User));

        assert!(ctx.user().is_none());
        assert_eq!(authed.user().map(|u| u.user_id.as_str()), Some("u1"));
        assert_eq!(authed.path, ctx.path);
    }

    #[test]
    fn test_cookie_header() {
        let ctx = RequestContext::new(Method::GET, "/")
            .with_header("cookie", "auth_token=abc123");
        assert_eq!(ctx.cookie_header().as_deref(), Some("auth_token=abc123"));
        assert_eq!(RequestContext::new(Method::GET, "/").cookie_header(), None);
    }

    #[test]
    fn test_repeated_cookie_headers_are_joined() {
        let ctx = RequestContext::new(Method::GET, "/")
            .with_header("cookie", "theme=dark")
            .with_header("cookie", "auth_token=abc123");
        assert_eq!(
            ctx.cookie_header().as_deref(),
            Some("theme=dark; auth_token=abc123")
        );
    }

    #[derive(Debug, Deserialize)]
    struct Filter {
        search: Option<String>,
        category: Option<String>,
    }

    #[test]
    fn test_query_decoding() {
        let ctx = RequestContext::new(Method::GET, "/api/faqs")
            .with_query(Some("search=vacation%20days&category=HR"));
        let filter: Filter = ctx.query_as().unwrap();
        assert_eq!(filter.search.as_deref(), Some("vacation days"));
        assert_eq!(filter.category.as_deref(), Some("HR"));

        let empty: Filter = RequestContext::new(Method::GET, "/").query_as().unwrap();
        assert!(empty.search.is_none());
    }

    #[test]
    fn test_oversized_body_rejected() {
        let ctx = RequestContext::new(Method::POST, "/api/faqs")
            .with_body(vec![b' '; MAX_BODY_BYTES + 1]);
        let result: Result<serde_json::Value> = ctx.json();
        assert!(matches!(result, Err(FaqError::Http(_))));
    }
}
