//! Operator-triggered forced cleanup.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;
use webpify_core::bytes::format_bytes;

use crate::error::HttpAppError;
use crate::handlers::storage::StorageReport;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Bytes freed per role by one forced sweep, human-readable.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleanedReport {
    pub staging: String,
    pub converted: String,
    pub batch: String,
    pub total: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleanupData {
    pub removed_entries: usize,
    pub cleaned: CleanedReport,
    pub current: StorageReport,
}

/// Run a forced sweep with the short override TTL and report what it freed.
#[utoipa::path(
    post,
    path = "/api/cleanup",
    tag = "maintenance",
    responses(
        (status = 200, description = "Cleanup completed", body = CleanupData)
    )
)]
pub async fn run_cleanup(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<CleanupData>>, HttpAppError> {
    tracing::info!("Manual cleanup initiated");

    let before = state.lifecycle.usage().await?;
    let removed_entries = state.lifecycle.force_sweep().await;
    let after = state.lifecycle.usage().await?;

    let cleaned = CleanedReport {
        staging: format_bytes(before.staging.bytes.saturating_sub(after.staging.bytes)),
        converted: format_bytes(before.converted.bytes.saturating_sub(after.converted.bytes)),
        batch: format_bytes(before.batch.bytes.saturating_sub(after.batch.bytes)),
        total: format_bytes(
            before
                .total()
                .bytes
                .saturating_sub(after.total().bytes),
        ),
    };

    Ok(Json(ApiResponse::with_message(
        "Manual cleanup completed",
        CleanupData {
            removed_entries,
            cleaned,
            current: StorageReport::from(after),
        },
    )))
}
