//! Service info and liveness endpoints
//!
//! GET /         - service banner
//! GET /health   - liveness probe (server is up)
//! GET /version  - active policy version

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;
use std::sync::Arc;

use crate::state::AppState;

/// Name reported by the service banner.
pub const SERVICE_NAME: &str = "riskzone-api";

/// GET / - service banner
pub async fn root() -> impl IntoResponse {
    Json(json!({ "ok": true, "service": SERVICE_NAME }))
}

/// GET /health - liveness probe
///
/// Always returns 200 OK while the process is alive.
pub async fn health() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

/// GET /version - policy version the service was started with
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({ "version": state.policy.version }))
}

/// Build the health router sub-tree
pub fn health_router() -> axum::Router<Arc<AppState>> {
    use axum::routing::get;
    axum::Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/version", get(version))
}
