//! Health check endpoints for Kubernetes-style probes.
//!
//! - `/livez` - Basic liveness probe (immediate 200, no checks)
//! - `/healthz` - Catalog and bundle-cache stats

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::state::AppState;

/// GET /livez - Basic liveness probe.
///
/// Returns 200 immediately. Used to check if the server is accepting
/// connections.
#[axum::debug_handler]
pub async fn livez() -> StatusCode {
    StatusCode::OK
}

/// GET /healthz - Catalog and cache stats.
///
/// Fast endpoint suitable for frequent liveness checks; reads counters
/// only, never generates a bundle.
#[axum::debug_handler]
pub async fn healthz(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "polyfills": state.catalog.polyfill_count(),
        "aliases": state.catalog.alias_count(),
        "cached_bundles": state.bundle_cache_len(),
    }))
}
