//! HTTP routes

use crate::AppState;
use crate::error::ApiError;
use axum::{
    BoxError, Router,
    error_handling::HandleErrorLayer,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower::timeout::TimeoutLayer;
use tower::timeout::error::Elapsed;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

pub mod anagrams;
pub mod health;
pub mod stats;

const MAX_BODY_BYTES: usize = 16 * 1024;

/// Build the router with tracing, permissive CORS, a body limit and a request timeout.
///
/// A request that outlives `request_timeout` is answered with a `Storage` error,
/// since only storage calls can stall a handler.
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/api/v1/similar", get(anagrams::similar))
        .route("/api/v1/add-word", post(anagrams::add_word))
        .route("/api/v1/stats", get(stats::stats))
        .route("/health", get(health::health))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(HandleErrorLayer::new(move |err: BoxError| async move {
                    handle_middleware_error(err, request_timeout)
                }))
                .layer(TimeoutLayer::new(request_timeout)),
        )
}

fn handle_middleware_error(err: BoxError, request_timeout: Duration) -> ApiError {
    if err.is::<Elapsed>() {
        warn!(timeout = ?request_timeout, "Request timed out waiting for storage");
        ApiError::Storage { message: format!("Request timed out after {request_timeout:?}") }
    } else {
        ApiError::internal(err.to_string())
    }
}
