//! Session cookie handling
//!
//! The session token travels in an HttpOnly, SameSite=Strict cookie. Parsing
//! is lenient: malformed pairs in the `Cookie` header are skipped rather than
//! failing the request.

use cookie::{Cookie, SameSite};

/// Cookie name for the session token
pub const AUTH_COOKIE_NAME: &str = "auth_token";

/// Extract the session token from a raw `Cookie` header.
///
/// Returns `None` when the header is absent, holds no `auth_token` pair, or
/// the pair has an empty value. The first occurrence of a duplicated name
/// wins. Values are percent-decoded and surrounding double quotes dropped.
pub fn extract_token(cookie_header: Option<&str>) -> Option<String> {
    let header = cookie_header?;

    Cookie::split_parse_encoded(header)
        .flatten()
        .find(|c| c.name() == AUTH_COOKIE_NAME)
        .map(|c| c.value_trimmed().to_string())
        .filter(|value| !value.is_empty())
}

/// Build the `Set-Cookie` value carrying a freshly issued token
pub fn build_auth_cookie(token: &str, max_age_secs: u64, secure: bool) -> String {
    let max_age = i64::try_from(max_age_secs).unwrap_or(i64::MAX);

    Cookie::build((AUTH_COOKIE_NAME, token.to_string()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .max_age(cookie::time::Duration::seconds(max_age))
        .build()
        .to_string()
}

/// Build the `Set-Cookie` value that clears the session cookie
pub fn build_logout_cookie(secure: bool) -> String {
    Cookie::build((AUTH_COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .max_age(cookie::time::Duration::ZERO)
        .build()
        .to_string()
}
