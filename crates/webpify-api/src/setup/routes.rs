//! Router assembly and middleware layers.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use webpify_core::Config;

use crate::api_doc::openapi_json;
use crate::error::ErrorBody;
use crate::handlers::{
    batch_convert::batch_convert, cleanup::run_cleanup, convert::convert_image,
    download::download_batch, download::download_converted, health::health,
    storage::storage_report,
};
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config);
    // Room for a full batch of maximum-size files plus form overhead
    let body_limit =
        DefaultBodyLimit::max(state.config.max_file_size_bytes * (state.config.max_batch_files + 1));

    Router::new()
        .route("/api/convert", post(convert_image))
        .route("/api/batch-convert", post(batch_convert))
        .route("/api/download/{filename}", get(download_converted))
        .route("/api/download-batch/{filename}", get(download_batch))
        .route("/api/storage", get(storage_report))
        .route("/api/cleanup", post(run_cleanup))
        .route("/api/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(body_limit)
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Uniform envelope for unknown routes.
async fn not_found() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            success: false,
            error: "Endpoint not found".to_string(),
            code: "NOT_FOUND".to_string(),
        }),
    )
}
