//! OpenAPI document aggregation.

use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Webpify API",
        description = "Image to WebP conversion service with batch archiving and ephemeral storage"
    ),
    paths(
        crate::handlers::convert::convert_image,
        crate::handlers::batch_convert::batch_convert,
        crate::handlers::download::download_converted,
        crate::handlers::download::download_batch,
        crate::handlers::storage::storage_report,
        crate::handlers::cleanup::run_cleanup,
        crate::handlers::health::health,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::handlers::convert::ConvertData,
        crate::handlers::batch_convert::BatchConvertData,
        crate::handlers::storage::RoleReport,
        crate::handlers::storage::StorageReport,
        crate::handlers::cleanup::CleanedReport,
        crate::handlers::cleanup::CleanupData,
        crate::handlers::health::HealthData,
        webpify_core::models::ImageDimensions,
        webpify_core::models::BatchItemResult,
        webpify_core::models::BatchResult,
    )),
    tags(
        (name = "convert", description = "Image conversion"),
        (name = "download", description = "Artifact downloads"),
        (name = "maintenance", description = "Storage introspection and cleanup")
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI document as JSON.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
