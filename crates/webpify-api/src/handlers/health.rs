//! Health endpoint.

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::HttpAppError;
use crate::handlers::storage::StorageReport;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthData {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub storage: StorageReport,
}

/// Service status, uptime, and a storage snapshot.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "maintenance",
    responses(
        (status = 200, description = "Service is healthy", body = HealthData)
    )
)]
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<HealthData>>, HttpAppError> {
    let usage = state.lifecycle.usage().await?;

    Ok(Json(ApiResponse::new(HealthData {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        storage: StorageReport::from(usage),
    })))
}
