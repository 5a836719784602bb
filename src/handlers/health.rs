use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};
use tracing::info;

use crate::state::AppState;

/// Health check endpoint
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let pdf_service = state.extractor.is_available();
    let metrics = state.limiter.metrics();
    let active_sessions = state.sessions.len().await;

    let status = if pdf_service { "healthy" } else { "degraded" };

    let rejection_rate = if metrics.total_requests > 0 {
        (metrics.rejected_requests as f64 / metrics.total_requests as f64 * 100.0).round() / 100.0
    } else {
        0.0
    };

    info!(status = status, active_sessions, "Health check completed");

    Json(json!({
        "status": status,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "pdf_processor": pdf_service,
            "language_model": state.dispatcher.model()
        },
        "sessions": active_sessions,
        "rate_limiting": {
            "total_requests": metrics.total_requests,
            "rejected_requests": metrics.rejected_requests,
            "available_permits": metrics.available_permits,
            "rejection_rate": rejection_rate
        },
        "uptime_seconds": state.started_at.elapsed().as_secs()
    }))
}

/// Readiness check endpoint
pub async fn ready_handler(State(state): State<AppState>) -> StatusCode {
    if state.extractor.is_available() {
        StatusCode::OK
    } else {
        info!("Readiness check failed - PDF service unavailable");
        StatusCode::SERVICE_UNAVAILABLE
    }
}
