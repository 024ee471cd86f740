//! Storage introspection endpoint.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;
use webpify_core::bytes::format_bytes;
use webpify_storage::{RoleUsage, StorageUsage};

use crate::error::HttpAppError;
use crate::response::ApiResponse;
use crate::state::AppState;

/// One storage role's footprint, with both raw and human-readable sizes.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleReport {
    pub count: u64,
    pub size: String,
    pub size_bytes: u64,
}

impl From<RoleUsage> for RoleReport {
    fn from(usage: RoleUsage) -> Self {
        Self {
            count: usage.files,
            size: format_bytes(usage.bytes),
            size_bytes: usage.bytes,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StorageReport {
    pub staging: RoleReport,
    pub converted: RoleReport,
    pub batch: RoleReport,
    pub total: RoleReport,
}

impl From<StorageUsage> for StorageReport {
    fn from(usage: StorageUsage) -> Self {
        Self {
            staging: usage.staging.into(),
            converted: usage.converted.into(),
            batch: usage.batch.into(),
            total: usage.total().into(),
        }
    }
}

/// Per-role file counts and byte totals.
#[utoipa::path(
    get,
    path = "/api/storage",
    tag = "maintenance",
    responses(
        (status = 200, description = "Storage usage snapshot", body = StorageReport)
    )
)]
pub async fn storage_report(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<StorageReport>>, HttpAppError> {
    let usage = state.lifecycle.usage().await?;
    Ok(Json(ApiResponse::new(StorageReport::from(usage))))
}
