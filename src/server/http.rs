//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo for async handling. Each hyper request is
//! converted into a [`RequestContext`] and dispatched through the router.

use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::routes::Router;
use crate::server::AppState;
use crate::types::{ApiResponse, BoxBody, FaqError, RequestContext, MAX_BODY_BYTES};

/// Run the HTTP server until the process is stopped
pub async fn run(state: Arc<AppState>) -> Result<(), FaqError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "faqdesk listening on {} (storage: {})",
        state.args.listen,
        state.storage.as_str()
    );

    if state.args.dev_mode {
        warn!("Development mode enabled - session cookies are not marked Secure");
    }

    let router = Arc::new(Router::new(Arc::clone(&state)));

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let router = Arc::clone(&router);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let router = Arc::clone(&router);
                        async move { handle_request(router, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new()
                        .serve_connection(io, service)
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

async fn handle_request(
    router: Arc<Router>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<BoxBody>, hyper::Error> {
    let request_id = Uuid::new_v4().to_string();
    let started = Instant::now();
    let (parts, body) = req.into_parts();

    let body = match Limited::new(body, MAX_BODY_BYTES).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            let message = if e.downcast_ref::<LengthLimitError>().is_some() {
                "Request body too large".to_string()
            } else {
                format!("Failed to read body: {}", e)
            };
            warn!(request_id = %request_id, remote = %addr, "{}", message);
            return Ok(ApiResponse::error(StatusCode::BAD_REQUEST, message).into_http());
        }
    };

    let ctx = RequestContext::new(parts.method.clone(), parts.uri.path())
        .with_request_id(request_id.clone())
        .with_query(parts.uri.query())
        .with_headers(parts.headers)
        .with_body(body);

    let response = router.dispatch(ctx).await;

    info!(
        request_id = %request_id,
        remote = %addr,
        method = %parts.method,
        path = %parts.uri.path(),
        status = response.status.as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );

    Ok(response.into_http())
}
