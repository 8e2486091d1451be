use std::time::Duration;

use axum::{http::StatusCode, routing::get, Router};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    handlers::{
        health::{healthz, livez},
        polyfill::{polyfill, polyfill_min},
    },
    state::AppState,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    let polyfill_routes = Router::new()
        .route("/v3/polyfill.js", get(polyfill))
        .route("/v3/polyfill.min.js", get(polyfill_min));

    // Consumers can run the service on another context path; the bundle
    // routes then exist only under that prefix.
    let polyfill_routes = if state.config.context_path.is_empty() {
        polyfill_routes
    } else {
        Router::new().nest(&state.config.context_path, polyfill_routes)
    };

    Router::new()
        .route("/livez", get(livez))
        .route("/healthz", get(healthz))
        .merge(polyfill_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
        .with_state(state)
}
