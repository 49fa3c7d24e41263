//! Health check endpoints
//!
//! `/health` and `/healthz` are liveness checks: they answer 200 whenever the
//! process is serving, with build information attached.

use serde::Serialize;
use std::sync::Arc;

use crate::server::AppState;
use crate::types::{ApiResponse, RequestContext, Result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: &'static str,
    pub commit: &'static str,
    pub build_time: &'static str,
    /// Uptime in seconds
    pub uptime: u64,
    /// "mongodb" or "memory"
    pub storage: &'static str,
    /// "development" or "production"
    pub mode: &'static str,
}

/// GET /health, /healthz
pub async fn health(state: Arc<AppState>, _ctx: RequestContext) -> Result<ApiResponse> {
    Ok(ApiResponse::ok(&HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("GIT_COMMIT_SHORT").unwrap_or("unknown"),
        build_time: option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
        uptime: state.started_at.elapsed().as_secs(),
        storage: state.storage.as_str(),
        mode: if state.args.dev_mode {
            "development"
        } else {
            "production"
        },
    }))
}
