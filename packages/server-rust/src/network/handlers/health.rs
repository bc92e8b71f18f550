//! Health, liveness, and readiness endpoint handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;

use super::AppState;
use crate::network::HealthState;

/// Returns detailed health information as JSON.
///
/// Always returns 200; the `state` field tells whether the server is
/// actually serving.
pub async fn health_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "state": state.lifecycle.state().as_str(),
        "backend": state.repository.backend(),
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

/// Liveness probe, 200 while the process is responsive.
pub async fn liveness_handler() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe: 200 when ready, 503 while starting, draining or stopped.
pub async fn readiness_handler(State(state): State<AppState>) -> StatusCode {
    if state.lifecycle.state() == HealthState::Ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
