//! Service-level handlers

use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

/// GET / - Liveness
pub async fn root() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /healthcheck - Probe every container backend
pub async fn health_check(State(state): State<Arc<AppState>>) -> Response {
    let report = state.gateway.health().await;
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(report)).into_response()
}
