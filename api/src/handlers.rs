use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use shared::DocumentPayload;

use crate::{
    error::ApiError,
    state::AppState,
    validation::{DocumentRoute, ValidatedDocument},
};

pub const GREETING: &str = "Hello Express";

pub async fn index() -> &'static str {
    GREETING
}

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let uptime = state.started_at.elapsed().as_secs();
    let now = chrono::Utc::now().to_rfc3339();

    tracing::debug!(uptime_secs = uptime, "health check passed");
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": now,
            "uptime_secs": uptime
        })),
    )
}

/// PUT /applications/:application_id/{document}
///
/// The extractor has already sanitized and validated the body; the
/// normalized payload is echoed back.
pub async fn put_document<D: DocumentRoute>(document: ValidatedDocument<D>) -> Json<DocumentPayload> {
    tracing::info!(
        application_id = %document.application_id,
        document = %document.kind(),
        fields = document.payload.len(),
        "document accepted"
    );
    Json(document.payload)
}

pub async fn route_not_found() -> impl IntoResponse {
    ApiError::not_found("NotFound", "Not Found")
}
