//! End-to-end scenarios through the router with in-memory stores

use clap::Parser;
use hyper::{Method, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;

use faqdesk::routes::Router;
use faqdesk::types::{ApiResponse, RequestContext};
use faqdesk::{AppState, Args};

fn router() -> Router {
    let args =
        Args::try_parse_from(["faqdesk", "--dev-mode", "--allow-admin-signup"]).unwrap();
    Router::new(Arc::new(AppState::in_memory(args).unwrap()))
}

fn request(method: Method, path: &str, body: Option<Value>, cookie: Option<&str>) -> RequestContext {
    let mut ctx = RequestContext::new(method, path);
    if let Some(body) = body {
        ctx = ctx.with_body(body.to_string());
    }
    if let Some(cookie) = cookie {
        ctx = ctx.with_header("cookie", cookie);
    }
    ctx
}

/// `name=value` part of a Set-Cookie header
fn session_cookie(resp: &ApiResponse) -> String {
    resp.set_cookie
        .as_deref()
        .and_then(|c| c.split(';').next())
        .unwrap()
        .to_string()
}

async fn signup(router: &Router, email: &str, role: &str) -> String {
    let resp = router
        .dispatch(request(
            Method::POST,
            "/api/auth/signup",
            Some(json!({ "email": email, "password": "correct horse", "role": role })),
            None,
        ))
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);
    session_cookie(&resp)
}

#[tokio::test]
async fn admin_lifecycle() {
    let router = router();
    let admin = signup(&router, "admin@example.com", "admin").await;

    // Create
    let resp = router
        .dispatch(request(
            Method::POST,
            "/api/faqs",
            Some(json!({
                "question": "How do I request time off?",
                "answer": "Submit a request in the HR portal.",
                "category": "HR",
                "tags": ["pto", "leave"]
            })),
            Some(&admin),
        ))
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);
    let id = resp.body["_id"].as_str().unwrap().to_string();
    assert_eq!(resp.body["createdBy"]["email"], "admin@example.com");

    // Public listing
    let resp = router
        .dispatch(request(Method::GET, "/api/faqs", None, None))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["faqs"][0]["_id"], id.as_str());
    assert_eq!(resp.body["categories"], json!(["HR"]));

    // Public view counts
    let path = format!("/api/faqs/{}", id);
    let resp = router.dispatch(request(Method::GET, &path, None, None)).await;
    assert_eq!(resp.body["views"], 1);

    // Anonymous feedback
    let resp = router
        .dispatch(request(
            Method::POST,
            "/api/faqs/feedback",
            Some(json!({ "faqId": id, "helpful": true })),
            None,
        ))
        .await;
    assert_eq!(
        resp.body,
        json!({ "success": true, "helpfulYes": 1, "helpfulNo": 0 })
    );

    // Update
    let resp = router
        .dispatch(request(
            Method::PUT,
            &path,
            Some(json!({ "category": "People" })),
            Some(&admin),
        ))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["category"], "People");

    // Delete
    let resp = router
        .dispatch(request(Method::DELETE, &path, None, Some(&admin)))
        .await;
    assert_eq!(
        resp.body,
        json!({ "success": true, "message": "FAQ deleted successfully" })
    );

    let resp = router.dispatch(request(Method::GET, &path, None, None)).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.error_message(), Some("FAQ not found"));
}

#[tokio::test]
async fn mutations_are_gated() {
    let router = router();
    let user = signup(&router, "employee@example.com", "user").await;
    let body = json!({ "question": "Q?", "answer": "A.", "category": "General" });

    let resp = router
        .dispatch(request(Method::POST, "/api/faqs", Some(body.clone()), None))
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body, json!({ "error": "No token provided" }));

    let resp = router
        .dispatch(request(
            Method::POST,
            "/api/faqs",
            Some(body.clone()),
            Some("auth_token=forged.token.value"),
        ))
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body, json!({ "error": "Invalid token" }));

    let resp = router
        .dispatch(request(Method::POST, "/api/faqs", Some(body), Some(&user)))
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    assert_eq!(resp.body, json!({ "error": "Admin access required" }));

    let resp = router
        .dispatch(request(Method::GET, "/api/faqs", None, None))
        .await;
    assert!(resp.body["faqs"].as_array().unwrap().is_empty());

    // The gate runs before the id is looked up
    let resp = router
        .dispatch(request(Method::DELETE, "/api/faqs/does-not-exist", None, Some(&user)))
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn session_identity_and_logout() {
    let router = router();
    let cookie = signup(&router, "employee@example.com", "user").await;

    let resp = router
        .dispatch(request(Method::GET, "/api/auth/me", None, Some(&cookie)))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["user"]["email"], "employee@example.com");
    assert_eq!(resp.body["user"]["role"], "user");

    let resp = router
        .dispatch(request(Method::GET, "/api/auth/me", None, None))
        .await;
    assert_eq!(resp.error_message(), Some("No token provided"));

    let resp = router
        .dispatch(request(Method::POST, "/api/auth/logout", None, Some(&cookie)))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    let cleared = resp.set_cookie.unwrap();
    assert!(cleared.contains("Max-Age=0"));

    // A cleared cookie carries no credential
    let resp = router
        .dispatch(request(Method::GET, "/api/auth/me", None, Some("auth_token=")))
        .await;
    assert_eq!(resp.error_message(), Some("No token provided"));
}

#[tokio::test]
async fn method_and_path_handling() {
    let router = router();

    for (method, path) in [
        (Method::PATCH, "/api/faqs"),
        (Method::GET, "/api/faqs/feedback"),
        (Method::GET, "/api/auth/logout"),
        (Method::POST, "/api/auth/me"),
        (Method::POST, "/health"),
        (Method::OPTIONS, "/api/faqs"),
        (Method::OPTIONS, "/api/auth/me"),
    ] {
        let resp = router.dispatch(request(method, path, None, None)).await;
        assert_eq!(resp.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.body, json!({ "error": "Method not allowed" }));
    }

    let resp = router
        .dispatch(request(Method::GET, "/api/nothing-here", None, None))
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = router
        .dispatch(request(Method::OPTIONS, "/api/nothing-here", None, None))
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = router.dispatch(request(Method::GET, "/healthz", None, None)).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["healthy"], true);
    assert_eq!(resp.body["storage"], "memory");
}

#[tokio::test]
async fn malformed_bodies_are_client_errors() {
    let router = router();
    let mut ctx = RequestContext::new(Method::POST, "/api/auth/login");
    ctx = ctx.with_body("{not json");

    let resp = router.dispatch(ctx).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}
