//! Authentication gate
//!
//! Handlers are wrapped by middleware that either short-circuits with a
//! terminal rejection or delegates to the wrapped handler with an augmented
//! context. Per request the gate walks
//! `Unauthenticated -> CredentialPresent -> Authenticated -> Authorized`;
//! any failed transition ends the request.
//!
//! The gate holds no mutable state and never touches storage. Credential
//! verification is always awaited before the handler can run.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error};

use crate::auth::{extract_token, Role, TokenVerifier};
use crate::types::{ApiResponse, Rejection, RequestContext, Result};

/// Endpoint logic producing a response for a request
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, ctx: RequestContext) -> Result<ApiResponse>;
}

pub type BoxedHandler = Arc<dyn Handler>;

/// Adapter turning an async closure into a [`Handler`]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ApiResponse>> + Send + 'static,
{
    async fn call(&self, ctx: RequestContext) -> Result<ApiResponse> {
        (self.f)(ctx).await
    }
}

pub fn handler_fn<F, Fut>(f: F) -> BoxedHandler
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ApiResponse>> + Send + 'static,
{
    Arc::new(HandlerFn { f })
}

/// A wrapper enforcing a precondition before delegating
pub trait Middleware: Send + Sync {
    fn apply(&self, next: BoxedHandler) -> BoxedHandler;
}

// =============================================================================
// Authentication
// =============================================================================

/// Requires a present, valid session credential
#[derive(Clone)]
pub struct RequireAuthenticated {
    verifier: Arc<dyn TokenVerifier>,
}

impl RequireAuthenticated {
    pub fn new(verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { verifier }
    }
}

impl Middleware for RequireAuthenticated {
    fn apply(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(Authenticated {
            verifier: self.verifier.clone(),
            next,
        })
    }
}

struct Authenticated {
    verifier: Arc<dyn TokenVerifier>,
    next: BoxedHandler,
}

#[async_trait]
impl Handler for Authenticated {
    async fn call(&self, ctx: RequestContext) -> Result<ApiResponse> {
        let Some(token) = extract_token(ctx.cookie_header().as_deref()) else {
            debug!(request_id = %ctx.request_id, path = %ctx.path, "No session credential");
            return Ok(Rejection::NoCredential.into());
        };

        let user = match self.verifier.verify(&token).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                debug!(request_id = %ctx.request_id, path = %ctx.path, "Session credential rejected");
                return Ok(Rejection::InvalidCredential.into());
            }
            Err(e) => {
                error!(request_id = %ctx.request_id, error = %e, "Credential verifier failed");
                return Err(e);
            }
        };

        self.next.call(ctx.with_user(user)).await
    }
}

// =============================================================================
// Authorization
// =============================================================================

/// Requires the authenticated user to hold at least `role`.
///
/// Must run inside [`RequireAuthenticated`]; a context without a user is
/// answered as if no credential had been sent.
#[derive(Debug, Clone, Copy)]
pub struct RequireRole {
    role: Role,
}

impl RequireRole {
    pub fn new(role: Role) -> Self {
        Self { role }
    }
}

impl Middleware for RequireRole {
    fn apply(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(RoleChecked {
            role: self.role,
            next,
        })
    }
}

struct RoleChecked {
    role: Role,
    next: BoxedHandler,
}

#[async_trait]
impl Handler for RoleChecked {
    async fn call(&self, ctx: RequestContext) -> Result<ApiResponse> {
        let Some(user) = ctx.user() else {
            return Ok(Rejection::NoCredential.into());
        };

        if !user.role.satisfies(self.role) {
            debug!(
                request_id = %ctx.request_id,
                user_id = %user.user_id,
                role = %user.role,
                required = %self.role,
                "Insufficient role"
            );
            return Ok(Rejection::InsufficientRole.into());
        }

        self.next.call(ctx).await
    }
}

// =============================================================================
// Composition
// =============================================================================

/// Ordered middleware stack; the first element is the outermost wrapper
#[derive(Clone, Default)]
pub struct Chain {
    layers: Vec<Arc<dyn Middleware>>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, layer: impl Middleware + 'static) -> Self {
        self.layers.push(Arc::new(layer));
        self
    }
}

impl Middleware for Chain {
    fn apply(&self, next: BoxedHandler) -> BoxedHandler {
        self.layers
            .iter()
            .rev()
            .fold(next, |inner, layer| layer.apply(inner))
    }
}

/// Wrap `handler` so it only runs for a valid credential
pub fn require_authenticated(verifier: Arc<dyn TokenVerifier>, handler: BoxedHandler) -> BoxedHandler {
    RequireAuthenticated::new(verifier).apply(handler)
}

/// Wrap `handler` so it only runs for a valid admin credential
pub fn require_admin(verifier: Arc<dyn TokenVerifier>, handler: BoxedHandler) -> BoxedHandler {
    Chain::new()
        .with(RequireAuthenticated::new(verifier))
        .with(RequireRole::new(Role::Admin))
        .apply(handler)
}
