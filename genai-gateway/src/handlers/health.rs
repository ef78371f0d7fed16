use crate::services::metrics::get_metrics;
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use service_core::error::AppError;

/// Liveness probe.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "genai-gateway",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness probe: ready once an upstream credential is configured.
pub async fn readiness_check(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    if !state.forwarder.api().is_configured() {
        return Err(AppError::ServiceUnavailable);
    }
    Ok((StatusCode::OK, Json(json!({ "status": "ready" }))))
}

pub async fn metrics() -> impl IntoResponse {
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4",
        )],
        get_metrics(),
    )
}
