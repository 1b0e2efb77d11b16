//! Liveness endpoints.

use axum::Json;
use chrono::Utc;
use serde::Serialize;

/// Health check response body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// Health check.
///
/// Returns `ok` with the current time in epoch milliseconds. Does not contact BigCommerce.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().timestamp_millis(),
    })
}

/// Plain-text banner at the root path.
pub async fn root() -> &'static str {
    "Backend API running"
}
