pub mod models;
pub mod review;

// Re-exports
pub use models::*;

use axum::{
    error_handling::HandleErrorLayer,
    extract::State,
    http::{Method, Uri},
    routing::get,
    BoxError, Json, Router,
};
use std::time::Duration;
use tower::{timeout::error::Elapsed, timeout::TimeoutLayer, ServiceBuilder};
use tower_http::trace::TraceLayer;

/// Build the full router: review routes, health check, and JSON fallbacks
/// for unknown paths and wrong methods. Requests running longer than
/// `request_timeout` are answered with the error envelope.
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .merge(review::routes())
        .fallback(fallback_handler)
        .method_not_allowed_fallback(method_not_allowed_handler)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(move |err: BoxError| async move {
                    handle_timeout_error(err, request_timeout)
                }))
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .layer(TraceLayer::new_for_http())
}

pub async fn health_handler(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let total_reviews = state.store.count().await?;
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: state.store.backend().to_string(),
        total_reviews,
    }))
}

async fn fallback_handler(method: Method, uri: Uri) -> ApiError {
    ApiError::Validation(format!("no route for {} {}", method, uri.path()))
}

async fn method_not_allowed_handler(method: Method, uri: Uri) -> ApiError {
    ApiError::Validation(format!("method {} not allowed on {}", method, uri.path()))
}

fn handle_timeout_error(err: BoxError, limit: Duration) -> ApiError {
    if err.is::<Elapsed>() {
        ApiError::RequestTimeout(limit)
    } else {
        ApiError::Internal(err.to_string())
    }
}
