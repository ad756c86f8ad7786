//! Health check handlers

use axum::extract::State;
use serde::Serialize;

use crate::response::{ApiResult, Envelope};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

/// Liveness probe
///
/// GET /health
pub async fn health_check() -> ApiResult<HealthStatus> {
    Ok(Envelope::success(HealthStatus { status: "ok" }))
}

/// Readiness probe: verifies the database answers
///
/// GET /health/ready
pub async fn readiness_check(State(state): State<AppState>) -> ApiResult<HealthStatus> {
    match ident_db::ping(state.service_context().pool()).await {
        Ok(()) => Ok(Envelope::success(HealthStatus { status: "ready" })),
        Err(e) => Ok(Envelope::failure(format!("Database unavailable: {e}"))),
    }
}
