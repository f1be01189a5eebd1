//! Health check endpoint for service monitoring.

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::server::AppState;

/// Health check response.
///
/// Returns service status, key store connectivity and whether the request
/// loop is still accepting work.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall service status
    pub status: String,

    /// Key store connection status
    pub database: String,

    /// Request loop status
    pub service: String,

    /// Current server timestamp
    pub timestamp: DateTime<Utc>,
}

/// Health check handler.
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "status": "healthy",
///   "database": "connected",
///   "service": "running",
///   "timestamp": "2025-12-21T19:00:00Z"
/// }
/// ```
///
/// # Response (503 Service Unavailable)
///
/// Same shape with `"status": "unhealthy"` when the store is unreachable or
/// the request loop has stopped.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database_ok = sqlx::query("SELECT 1").execute(&state.pool).await.is_ok();
    let service_ok = !state.requests.is_closed();

    let status = if database_ok && service_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if status == StatusCode::OK { "healthy" } else { "unhealthy" }.to_string(),
            database: if database_ok { "connected" } else { "disconnected" }.to_string(),
            service: if service_ok { "running" } else { "stopped" }.to_string(),
            timestamp: Utc::now(),
        }),
    )
}
