use crate::models::ListRequest;
use crate::services::get_metrics;
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "catalog-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Ready once the bucket answers a one-key listing.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let mut probe = ListRequest::page(None);
    probe.max_keys = 1;

    match state.storage.list(&probe).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!("Readiness probe failed: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}
