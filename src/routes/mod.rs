//! HTTP routes
//!
//! - `/api/faqs`, `/api/faqs/{id}`, `/api/faqs/feedback` - FAQ knowledge base
//! - `/api/auth/*` - signup, login, logout, current user
//! - `/health`, `/healthz` - liveness
//!
//! Mutating FAQ endpoints are wrapped by the admin gate; `/api/auth/me` by
//! the authentication gate. A known path with an unsupported method answers
//! 405 before any gate runs.

pub mod auth_routes;
pub mod faqs;
pub mod health;

use hyper::{Method, StatusCode};
use std::future::Future;
use std::sync::Arc;
use tracing::error;

use crate::auth::{handler_fn, require_admin, require_authenticated, BoxedHandler, TokenVerifier};
use crate::server::AppState;
use crate::types::{ApiResponse, Rejection, RequestContext, Result};

/// Known paths
#[derive(Debug, Clone, PartialEq, Eq)]
enum Route {
    Health,
    Faqs,
    FaqFeedback,
    Faq(String),
    Signup,
    Login,
    Logout,
    Me,
}

fn match_route(path: &str) -> Option<Route> {
    let path = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };

    let route = match path {
        "/health" | "/healthz" => Route::Health,
        "/api/faqs" => Route::Faqs,
        "/api/faqs/feedback" => Route::FaqFeedback,
        "/api/auth/signup" => Route::Signup,
        "/api/auth/login" => Route::Login,
        "/api/auth/logout" => Route::Logout,
        "/api/auth/me" => Route::Me,
        other => {
            let id = other.strip_prefix("/api/faqs/")?;
            if id.is_empty() || id.contains('/') {
                return None;
            }
            Route::Faq(id.to_string())
        }
    };

    Some(route)
}

/// Bind a state-taking endpoint function into a handler
fn bind<F, Fut>(state: &Arc<AppState>, f: F) -> BoxedHandler
where
    F: Fn(Arc<AppState>, RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ApiResponse>> + Send + 'static,
{
    let state = Arc::clone(state);
    handler_fn(move |ctx| f(Arc::clone(&state), ctx))
}

/// Endpoint table with the gates already applied
pub struct Router {
    health: BoxedHandler,
    list_faqs: BoxedHandler,
    create_faq: BoxedHandler,
    get_faq: BoxedHandler,
    update_faq: BoxedHandler,
    delete_faq: BoxedHandler,
    feedback: BoxedHandler,
    signup: BoxedHandler,
    login: BoxedHandler,
    logout: BoxedHandler,
    me: BoxedHandler,
}

impl Router {
    pub fn new(state: Arc<AppState>) -> Self {
        let verifier: Arc<dyn TokenVerifier> = state.jwt.clone();

        Self {
            health: bind(&state, health::health),
            list_faqs: bind(&state, faqs::list),
            create_faq: require_admin(verifier.clone(), bind(&state, faqs::create)),
            get_faq: bind(&state, faqs::get),
            update_faq: require_admin(verifier.clone(), bind(&state, faqs::update)),
            delete_faq: require_admin(verifier.clone(), bind(&state, faqs::delete)),
            feedback: bind(&state, faqs::feedback),
            signup: bind(&state, auth_routes::signup),
            login: bind(&state, auth_routes::login),
            logout: bind(&state, auth_routes::logout),
            me: require_authenticated(verifier, bind(&state, auth_routes::me)),
        }
    }

    fn handler(&self, route: &Route, method: &Method) -> Option<&BoxedHandler> {
        let handler = match (route, method) {
            (Route::Health, &Method::GET) => &self.health,
            (Route::Faqs, &Method::GET) => &self.list_faqs,
            (Route::Faqs, &Method::POST) => &self.create_faq,
            (Route::FaqFeedback, &Method::POST) => &self.feedback,
            (Route::Faq(_), &Method::GET) => &self.get_faq,
            (Route::Faq(_), &Method::PUT) => &self.update_faq,
            (Route::Faq(_), &Method::DELETE) => &self.delete_faq,
            (Route::Signup, &Method::POST) => &self.signup,
            (Route::Login, &Method::POST) => &self.login,
            (Route::Logout, &Method::POST) => &self.logout,
            (Route::Me, &Method::GET) => &self.me,
            _ => return None,
        };
        Some(handler)
    }

    /// Route a request and produce its response. Never fails: handler
    /// errors become error responses here.
    pub async fn dispatch(&self, ctx: RequestContext) -> ApiResponse {
        let Some(route) = match_route(&ctx.path) else {
            return ApiResponse::error(StatusCode::NOT_FOUND, "Not found");
        };

        let Some(handler) = self.handler(&route, &ctx.method) else {
            return Rejection::MethodNotAllowed.into();
        };

        let ctx = match route {
            Route::Faq(id) => ctx.with_param("id", id),
            _ => ctx,
        };

        let request_id = ctx.request_id.clone();
        match handler.call(ctx).await {
            Ok(response) => response,
            Err(e) => {
                if e.status_code().is_server_error() {
                    error!(request_id = %request_id, error = %e, "Request failed");
                }
                ApiResponse::from(&e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_route() {
        assert_eq!(match_route("/api/faqs"), Some(Route::Faqs));
        assert_eq!(match_route("/api/faqs/"), Some(Route::Faqs));
        assert_eq!(match_route("/api/faqs/feedback"), Some(Route::FaqFeedback));
        assert_eq!(
            match_route("/api/faqs/64b7f0c2a1e4d3b2c1a09f8e"),
            Some(Route::Faq("64b7f0c2a1e4d3b2c1a09f8e".into()))
        );
        assert_eq!(match_route("/healthz"), Some(Route::Health));
        assert_eq!(match_route("/api/auth/me"), Some(Route::Me));
    }

    #[test]
    fn test_unknown_routes() {
        assert_eq!(match_route("/"), None);
        assert_eq!(match_route("/api/faqs/a/b"), None);
        assert_eq!(match_route("/api/users"), None);
    }

    #[tokio::test]
    async fn test_options_is_not_a_handled_method() {
        use crate::config::Args;
        use clap::Parser;

        let args = Args::try_parse_from(["faqdesk", "--dev-mode"]).unwrap();
        let router = Router::new(Arc::new(AppState::in_memory(args).unwrap()));

        let resp = router
            .dispatch(RequestContext::new(Method::OPTIONS, "/api/faqs/abc"))
            .await;
        assert_eq!(resp.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.error_message(), Some("Method not allowed"));

        let resp = router
            .dispatch(RequestContext::new(Method::OPTIONS, "/api/elsewhere"))
            .await;
        assert_eq!(resp.status, StatusCode::NOT_FOUND);
    }
}
