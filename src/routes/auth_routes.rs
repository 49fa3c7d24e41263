//! HTTP Routes for Authentication
//!
//! - POST /api/auth/signup - Create an account and start a session
//! - POST /api/auth/login  - Authenticate and start a session
//! - POST /api/auth/logout - Clear the session cookie
//! - GET  /api/auth/me     - Current user from the session (authenticated)
//!
//! Sessions are JWTs in the `auth_token` cookie; nothing is kept server-side,
//! so logout only expires the cookie.

use hyper::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::auth::{
    build_auth_cookie, build_logout_cookie, hash_password, verify_password, AuthUser, Role,
};
use crate::server::AppState;
use crate::store::{NewUser, UserRecord};
use crate::types::{ApiResponse, FaqError, Rejection, RequestContext, Result};

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// "user" (default) or "admin"
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub success: bool,
    pub user: AuthUser,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: AuthUser,
}

/// Emails are compared case-insensitively
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn credentials<'a>(
    email: &'a Option<String>,
    password: &'a Option<String>,
) -> Option<(String, &'a str)> {
    let email = email.as_deref().map(normalize_email).filter(|e| !e.is_empty())?;
    let password = password.as_deref().filter(|p| !p.is_empty())?;
    Some((email, password))
}

fn credentials_required() -> ApiResponse {
    ApiResponse::error(StatusCode::BAD_REQUEST, "Email and password are required")
}

/// Issue a token for `user` and answer with the session cookie set
fn start_session(state: &AppState, user: &UserRecord, status: StatusCode) -> Result<ApiResponse> {
    let identity = AuthUser::new(user.id.clone(), user.email.clone(), user.role);
    let token = state.jwt.generate_token(&identity)?;
    let cookie = build_auth_cookie(
        &token,
        state.jwt.expiry_seconds(),
        state.args.secure_cookies(),
    );

    Ok(ApiResponse::json(
        status,
        &SessionResponse {
            success: true,
            user: identity,
        },
    )
    .with_cookie(cookie))
}

// =============================================================================
// Route Handlers
// =============================================================================

/// POST /api/auth/signup
pub async fn signup(state: Arc<AppState>, ctx: RequestContext) -> Result<ApiResponse> {
    let req: SignupRequest = ctx.json()?;

    let Some((email, password)) = credentials(&req.email, &req.password) else {
        return Ok(credentials_required());
    };

    let role = match req.role.as_deref() {
        None | Some("") => Role::User,
        Some(raw) => match raw.parse::<Role>() {
            Ok(Role::Admin) if !state.args.allow_admin_signup => {
                warn!(email = %email, "Rejected admin signup");
                return Ok(ApiResponse::error(
                    StatusCode::FORBIDDEN,
                    "Admin signup is disabled",
                ));
            }
            Ok(role) => role,
            Err(_) => {
                return Ok(ApiResponse::error(StatusCode::BAD_REQUEST, "Invalid role"));
            }
        },
    };

    let password_hash = hash_password(password)?;

    let user = match state
        .users
        .create(NewUser {
            email,
            password_hash,
            role,
        })
        .await
    {
        Ok(user) => user,
        Err(FaqError::Conflict(_)) => {
            return Ok(ApiResponse::error(StatusCode::CONFLICT, "User already exists"));
        }
        Err(e) => {
            error!(request_id = %ctx.request_id, error = %e, "Failed to create user");
            return Ok(ApiResponse::server_error("Failed to create user"));
        }
    };

    info!(user_id = %user.id, role = %user.role, "User signed up");
    start_session(&state, &user, StatusCode::CREATED)
}

/// POST /api/auth/login
pub async fn login(state: Arc<AppState>, ctx: RequestContext) -> Result<ApiResponse> {
    let req: LoginRequest = ctx.json()?;

    let Some((email, password)) = credentials(&req.email, &req.password) else {
        return Ok(credentials_required());
    };

    let user = match state.users.find_by_email(&email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            info!(email = %email, "Login failed: unknown user");
            return Ok(ApiResponse::error(StatusCode::UNAUTHORIZED, "Invalid credentials"));
        }
        Err(e) => {
            error!(request_id = %ctx.request_id, error = %e, "Failed to look up user");
            return Ok(ApiResponse::server_error("Login failed"));
        }
    };

    if !verify_password(password, &user.password_hash)? {
        info!(email = %email, "Login failed: wrong password");
        return Ok(ApiResponse::error(StatusCode::UNAUTHORIZED, "Invalid credentials"));
    }

    info!(user_id = %user.id, "User logged in");
    start_session(&state, &user, StatusCode::OK)
}

/// POST /api/auth/logout
pub async fn logout(state: Arc<AppState>, _ctx: RequestContext) -> Result<ApiResponse> {
    Ok(ApiResponse::ok(&json!({
        "success": true,
        "message": "Logged out successfully"
    }))
    .with_cookie(build_logout_cookie(state.args.secure_cookies())))
}

/// GET /api/auth/me (authenticated)
pub async fn me(_state: Arc<AppState>, ctx: RequestContext) -> Result<ApiResponse> {
    match ctx.user() {
        Some(user) => Ok(ApiResponse::ok(&MeResponse { user: user.clone() })),
        None => Ok(Rejection::NoCredential.into()),
    }
}
