use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

/// Runs the full ingestion pipeline and publishes a fresh index.
pub async fn rebuild(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let report = state.rebuild_index().await?;
    Ok(Json(json!({
        "documents": report.documents,
        "chunks": report.chunks,
        "skipped": report.skipped,
    })))
}
