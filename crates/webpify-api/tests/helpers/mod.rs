//! Shared test fixtures: a fully wired app over temporary storage, plus
//! image generation helpers.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use image::{ImageFormat, Rgba, RgbaImage};
use tempfile::TempDir;
use webpify_api::setup::routes::build_router;
use webpify_api::state::AppState;
use webpify_core::Config;

pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    _root: TempDir,
}

pub fn test_config(root: &Path) -> Config {
    Config {
        server_port: 0,
        cors_origins: vec!["*".to_string()],
        environment: "test".to_string(),
        storage_root: root.to_path_buf(),
        max_file_size_bytes: 10 * 1024 * 1024,
        max_batch_files: 20,
        allowed_content_types: vec![
            "image/jpeg".to_string(),
            "image/jpg".to_string(),
            "image/png".to_string(),
            "image/gif".to_string(),
            "image/bmp".to_string(),
            "image/tiff".to_string(),
            "image/webp".to_string(),
        ],
        staging_ttl: Duration::from_secs(1800),
        converted_ttl: Duration::from_secs(3600),
        batch_ttl: Duration::from_secs(3600),
        sweep_interval: Duration::from_secs(900),
        forced_sweep_ttl: Duration::from_secs(300),
        download_grace: Duration::from_secs(30),
        batch_download_grace: Duration::from_secs(60),
        batch_dir_grace: Duration::from_secs(5),
        max_concurrent_conversions: 4,
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with(customize: impl FnOnce(&mut Config)) -> TestApp {
    let root = tempfile::tempdir().expect("create temp storage root");
    let mut config = test_config(root.path());
    customize(&mut config);

    let state = AppState::from_config(config).await.expect("build app state");
    let server = TestServer::new(build_router(state.clone())).expect("start test server");

    TestApp {
        server,
        state,
        _root: root,
    }
}

/// A solid-color PNG of the given dimensions.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([64, 128, 192, 255]));
    let mut buffer = Vec::new();
    let mut cursor = Cursor::new(&mut buffer);
    img.write_to(&mut cursor, ImageFormat::Png).unwrap();
    buffer
}

pub fn png_part(filename: &str, data: Vec<u8>) -> Part {
    Part::bytes(data).file_name(filename).mime_type("image/png")
}

pub fn single_upload(filename: &str, data: Vec<u8>) -> MultipartForm {
    MultipartForm::new().add_part("image", png_part(filename, data))
}
