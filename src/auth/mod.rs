//! Authentication and authorization
//!
//! - Session tokens (JWT, HS256) carried in the `auth_token` cookie
//! - Password hashing (Argon2id)
//! - The gate: middleware requiring a valid credential and, for admin-only
//!   endpoints, the admin role

pub mod jwt;
mod middleware;
mod password;
mod role;
mod session;
mod verifier;

pub use session::{build_auth_cookie, build_logout_cookie, extract_token, AUTH_COOKIE_NAME};
pub use jwt::{Claims, JwtValidator, TokenValidationResult, DEFAULT_EXPIRY_SECONDS};
pub use middleware::{
    handler_fn, require_admin, require_authenticated, BoxedHandler, Chain, Handler, HandlerFn,
    Middleware, RequireAuthenticated, RequireRole,
};
pub use password::{hash_password, verify_password};
pub use role::Role;
pub use verifier::{AuthUser, TokenVerifier};
