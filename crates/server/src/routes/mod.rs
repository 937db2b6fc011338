//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database ping)
//!
//! # Farms (JSON, credential in Authorization header or body)
//! POST /api/v1/farms/create    - Create a farm owned by the caller
//! POST /api/v1/farms/delete    - Delete one of the caller's farms
//! POST /api/v1/farms/all       - Yield report for the outlier or normal cohort
//! ```

pub mod farms;
pub mod health;

use axum::{
    Router,
    extract::Request,
    middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::{Span, field, info_span};

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the farm routes router.
pub fn farm_routes() -> Router<AppState> {
    Router::new()
        .route("/create", post(farms::create))
        .route("/delete", post(farms::delete))
        .route("/all", post(farms::all))
}

/// Create all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/v1/farms", farm_routes())
}

/// Full application router with request ID and tracing layers.
///
/// Sentry layers are added by the binary, since they need an initialized
/// client to be useful.
pub fn app(state: AppState) -> Router {
    routes()
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .with_state(state)
}

/// Span for one request; `request_id` is filled in by the request ID middleware.
fn request_span(request: &Request) -> Span {
    info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = field::Empty,
    )
}
