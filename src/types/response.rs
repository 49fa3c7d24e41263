//! Transport-neutral handler responses

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::SET_COOKIE;
use hyper::{Response, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};

use crate::types::{FaqError, Rejection};

pub type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// A handler's answer: status, JSON body and an optional `Set-Cookie`
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
    pub set_cookie: Option<String>,
}

impl ApiResponse {
    pub fn json<T: Serialize>(status: StatusCode, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => Self {
                status,
                body,
                set_cookie: None,
            },
            Err(e) => Self::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to serialize response: {}", e),
            ),
        }
    }

    pub fn ok<T: Serialize>(body: &T) -> Self {
        Self::json(StatusCode::OK, body)
    }

    pub fn created<T: Serialize>(body: &T) -> Self {
        Self::json(StatusCode::CREATED, body)
    }

    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
            set_cookie: None,
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::error(StatusCode::NOT_FOUND, message)
    }

    pub fn server_error(message: &str) -> Self {
        Self::error(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn with_cookie(mut self, cookie: String) -> Self {
        self.set_cookie = Some(cookie);
        self
    }

    /// The `error` string of an error body, if any
    pub fn error_message(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }

    /// Build the wire response
    pub fn into_http(self) -> Response<BoxBody> {
        let mut builder = Response::builder()
            .status(self.status)
            .header("Content-Type", "application/json");

        if let Some(cookie) = self.set_cookie {
            builder = builder.header(SET_COOKIE, cookie);
        }

        builder.body(full_body(self.body.to_string())).unwrap()
    }
}

impl From<Rejection> for ApiResponse {
    fn from(rejection: Rejection) -> Self {
        Self::error(rejection.status_code(), rejection.to_string())
    }
}

impl From<&FaqError> for ApiResponse {
    /// Client errors keep their message; server-side detail stays in the logs
    fn from(err: &FaqError) -> Self {
        let status = err.status_code();
        let message = match err {
            FaqError::BadRequest(msg)
            | FaqError::NotFound(msg)
            | FaqError::Conflict(msg)
            | FaqError::Http(msg) => msg.clone(),
            _ => "Internal server error".to_string(),
        };
        Self::error(status, message)
    }
}

pub fn full_body(data: impl Into<Bytes>) -> BoxBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}
