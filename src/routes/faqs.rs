//! FAQ endpoints
//!
//! - GET    /api/faqs          - list with search/category/tags filters
//! - POST   /api/faqs          - create (admin)
//! - GET    /api/faqs/{id}     - fetch and count a view
//! - PUT    /api/faqs/{id}     - update (admin)
//! - DELETE /api/faqs/{id}     - delete (admin)
//! - POST   /api/faqs/feedback - helpful / not helpful vote

use hyper::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

use crate::server::AppState;
use crate::store::{Creator, Faq, FaqFilter, FaqUpdate, NewFaq};
use crate::types::{ApiResponse, Rejection, RequestContext, Result};

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub tags: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub faqs: Vec<Faq>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateFaqRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateFaqRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Loosely typed so a non-boolean `helpful` gets the 400 below rather than
/// a JSON error
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    #[serde(default)]
    pub faq_id: Option<Value>,
    #[serde(default)]
    pub helpful: Option<Value>,
}

const FAQ_NOT_FOUND: &str = "FAQ not found";

fn faq_id(ctx: &RequestContext) -> &str {
    ctx.param("id").unwrap_or_default()
}

/// A required text field: present and not blank
fn required(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.trim().is_empty())
}

// =============================================================================
// Route Handlers
// =============================================================================

/// GET /api/faqs
pub async fn list(state: Arc<AppState>, ctx: RequestContext) -> Result<ApiResponse> {
    let query: ListQuery = ctx.query_as()?;
    let filter = FaqFilter::from_query(query.search, query.category, query.tags);

    let listing = async {
        let faqs = state.faqs.list(&filter).await?;
        let facets = state.faqs.facets().await?;
        Ok::<_, crate::types::FaqError>(ListResponse {
            faqs,
            categories: facets.categories,
            tags: facets.tags,
        })
    };

    match listing.await {
        Ok(body) => Ok(ApiResponse::ok(&body)),
        Err(e) => {
            error!(request_id = %ctx.request_id, error = %e, "Failed to fetch FAQs");
            Ok(ApiResponse::server_error("Failed to fetch FAQs"))
        }
    }
}

/// POST /api/faqs (admin)
pub async fn create(state: Arc<AppState>, ctx: RequestContext) -> Result<ApiResponse> {
    let Some(user) = ctx.user() else {
        return Ok(Rejection::NoCredential.into());
    };

    let req: CreateFaqRequest = ctx.json()?;

    let (Some(question), Some(answer), Some(category)) = (
        required(&req.question),
        required(&req.answer),
        required(&req.category),
    ) else {
        return Ok(ApiResponse::error(
            StatusCode::BAD_REQUEST,
            "Question, answer, and category are required",
        ));
    };

    let new_faq = NewFaq::new(
        question,
        answer,
        category,
        req.tags.clone().unwrap_or_default(),
        Creator {
            id: user.user_id.clone(),
            email: user.email.clone(),
        },
    );

    match state.faqs.create(new_faq).await {
        Ok(faq) => {
            info!(faq_id = %faq.id, user_id = %user.user_id, "FAQ created");
            Ok(ApiResponse::created(&faq))
        }
        Err(e) => {
            error!(request_id = %ctx.request_id, error = %e, "Failed to create FAQ");
            Ok(ApiResponse::server_error("Failed to create FAQ"))
        }
    }
}

/// GET /api/faqs/{id}
pub async fn get(state: Arc<AppState>, ctx: RequestContext) -> Result<ApiResponse> {
    match state.faqs.get_and_count_view(faq_id(&ctx)).await {
        Ok(Some(faq)) => Ok(ApiResponse::ok(&faq)),
        Ok(None) => Ok(ApiResponse::not_found(FAQ_NOT_FOUND)),
        Err(e) => {
            error!(request_id = %ctx.request_id, error = %e, "Failed to fetch FAQ");
            Ok(ApiResponse::server_error("Failed to fetch FAQ"))
        }
    }
}

/// PUT /api/faqs/{id} (admin)
pub async fn update(state: Arc<AppState>, ctx: RequestContext) -> Result<ApiResponse> {
    let req: UpdateFaqRequest = ctx.json()?;

    let update = FaqUpdate {
        question: req.question,
        answer: req.answer,
        category: req.category,
        tags: req.tags,
    }
    .normalized();

    match state.faqs.update(faq_id(&ctx), update).await {
        Ok(Some(faq)) => {
            info!(faq_id = %faq.id, "FAQ updated");
            Ok(ApiResponse::ok(&faq))
        }
        Ok(None) => Ok(ApiResponse::not_found(FAQ_NOT_FOUND)),
        Err(e) => {
            error!(request_id = %ctx.request_id, error = %e, "Failed to update FAQ");
            Ok(ApiResponse::server_error("Failed to update FAQ"))
        }
    }
}

/// DELETE /api/faqs/{id} (admin)
pub async fn delete(state: Arc<AppState>, ctx: RequestContext) -> Result<ApiResponse> {
    let id = faq_id(&ctx);

    match state.faqs.delete(id).await {
        Ok(true) => {
            info!(faq_id = %id, "FAQ deleted");
            Ok(ApiResponse::ok(&json!({
                "success": true,
                "message": "FAQ deleted successfully"
            })))
        }
        Ok(false) => Ok(ApiResponse::not_found(FAQ_NOT_FOUND)),
        Err(e) => {
            error!(request_id = %ctx.request_id, error = %e, "Failed to delete FAQ");
            Ok(ApiResponse::server_error("Failed to delete FAQ"))
        }
    }
}

/// POST /api/faqs/feedback
pub async fn feedback(state: Arc<AppState>, ctx: RequestContext) -> Result<ApiResponse> {
    let req: FeedbackRequest = ctx.json()?;

    let faq_id = req
        .faq_id
        .as_ref()
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty());
    let helpful = req.helpful.as_ref().and_then(Value::as_bool);

    let (Some(faq_id), Some(helpful)) = (faq_id, helpful) else {
        return Ok(ApiResponse::error(
            StatusCode::BAD_REQUEST,
            "FAQ ID and helpful flag are required",
        ));
    };

    match state.faqs.record_feedback(faq_id, helpful).await {
        Ok(Some(counts)) => Ok(ApiResponse::ok(&json!({
            "success": true,
            "helpfulYes": counts.helpful_yes,
            "helpfulNo": counts.helpful_no,
        }))),
        Ok(None) => Ok(ApiResponse::not_found(FAQ_NOT_FOUND)),
        Err(e) => {
            error!(request_id = %ctx.request_id, error = %e, "Failed to submit feedback");
            Ok(ApiResponse::server_error("Failed to submit feedback"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthUser, Role};
    use crate::config::Args;
    use clap::Parser;
    use hyper::Method;

    fn state() -> Arc<AppState> {
        let args = Args::try_parse_from(["faqdesk", "--dev-mode"]).unwrap();
        Arc::new(AppState::in_memory(args).unwrap())
    }

    fn admin_ctx(method: Method, path: &str, body: Value) -> RequestContext {
        RequestContext::new(method, path)
            .with_body(body.to_string())
            .with_user(AuthUser::new("a1", "admin@example.com", Role::Admin))
    }

    async fn create_sample(state: &Arc<AppState>) -> Faq {
        let resp = create(
            state.clone(),
            admin_ctx(
                Method::POST,
                "/api/faqs",
                json!({
                    "question": "  How do I book a meeting room? ",
                    "answer": "Use the calendar.",
                    "category": "Facilities",
                    "tags": ["rooms", " calendar "]
                }),
            ),
        )
        .await
        .unwrap();
        assert_eq!(resp.status, StatusCode::CREATED);
        serde_json::from_value(resp.body).unwrap()
    }

    #[tokio::test]
    async fn test_create_trims_and_records_creator() {
        let state = state();
        let faq = create_sample(&state).await;

        assert_eq!(faq.question, "How do I book a meeting room?");
        assert_eq!(faq.tags, vec!["rooms", "calendar"]);
        assert_eq!(faq.created_by.id, "a1");
        assert_eq!(faq.created_by.email, "admin@example.com");
        assert_eq!(faq.views, 0);
    }

    #[tokio::test]
    async fn test_create_requires_fields() {
        let state = state();
        for body in [
            json!({ "answer": "a", "category": "c" }),
            json!({ "question": "q", "category": "c" }),
            json!({ "question": "q", "answer": "a", "category": "   " }),
        ] {
            let resp = create(state.clone(), admin_ctx(Method::POST, "/api/faqs", body))
                .await
                .unwrap();
            assert_eq!(resp.status, StatusCode::BAD_REQUEST);
            assert_eq!(
                resp.error_message(),
                Some("Question, answer, and category are required")
            );
        }
    }

    #[tokio::test]
    async fn test_get_counts_views() {
        let state = state();
        let faq = create_sample(&state).await;
        let ctx = RequestContext::new(Method::GET, "/api/faqs/x").with_param("id", faq.id.clone());

        get(state.clone(), ctx.clone()).await.unwrap();
        let resp = get(state.clone(), ctx).await.unwrap();

        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.body["views"], 2);
    }

    #[tokio::test]
    async fn test_missing_faq_is_404() {
        let state = state();
        let ctx = RequestContext::new(Method::GET, "/api/faqs/nope").with_param("id", "nope");

        let resp = get(state.clone(), ctx.clone()).await.unwrap();
        assert_eq!(resp.status, StatusCode::NOT_FOUND);
        assert_eq!(resp.error_message(), Some("FAQ not found"));

        let resp = delete(state, ctx).await.unwrap();
        assert_eq!(resp.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_with_filters() {
        let state = state();
        create_sample(&state).await;

        let ctx = RequestContext::new(Method::GET, "/api/faqs")
            .with_query(Some("search=ROOM&category=all"));
        let resp = list(state.clone(), ctx).await.unwrap();
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.body["faqs"].as_array().unwrap().len(), 1);
        assert_eq!(resp.body["categories"], json!(["Facilities"]));
        assert_eq!(resp.body["tags"], json!(["rooms", "calendar"]));

        let ctx = RequestContext::new(Method::GET, "/api/faqs").with_query(Some("tags=parking"));
        let resp = list(state, ctx).await.unwrap();
        assert!(resp.body["faqs"].as_array().unwrap().is_empty());
        assert_eq!(resp.body["categories"], json!(["Facilities"]));
    }

    #[tokio::test]
    async fn test_feedback_validation() {
        let state = state();
        let faq = create_sample(&state).await;

        for body in [
            json!({ "faqId": faq.id, "helpful": "yes" }),
            json!({ "faqId": "", "helpful": true }),
            json!({ "helpful": false }),
        ] {
            let ctx = RequestContext::new(Method::POST, "/api/faqs/feedback").with_body(body.to_string());
            let resp = feedback(state.clone(), ctx).await.unwrap();
            assert_eq!(resp.status, StatusCode::BAD_REQUEST);
            assert_eq!(resp.error_message(), Some("FAQ ID and helpful flag are required"));
        }

        let ctx = RequestContext::new(Method::POST, "/api/faqs/feedback")
            .with_body(json!({ "faqId": faq.id, "helpful": false }).to_string());
        let resp = feedback(state, ctx).await.unwrap();
        assert_eq!(
            resp.body,
            json!({ "success": true, "helpfulYes": 0, "helpfulNo": 1 })
        );
    }

    #[tokio::test]
    async fn test_update_changes_only_given_fields() {
        let state = state();
        let faq = create_sample(&state).await;

        let ctx = admin_ctx(
            Method::PUT,
            "/api/faqs/x",
            json!({ "answer": "Ask reception." }),
        )
        .with_param("id", faq.id.clone());
        let resp = update(state, ctx).await.unwrap();

        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.body["answer"], "Ask reception.");
        assert_eq!(resp.body["question"], faq.question);
    }
}
