//! Health check endpoints.

use axum::http::StatusCode;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// The storefront has no backing services, so it is ready as soon as it serves.
pub async fn readiness() -> StatusCode {
    StatusCode::OK
}
