mod helpers;

use std::time::Duration;

use helpers::{png_bytes, single_upload, spawn_app, spawn_app_with};
use serde_json::Value;

#[tokio::test]
async fn health_reports_status_uptime_and_storage() {
    let app = spawn_app().await;

    let response = app.server.get("/api/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    assert!(body["data"]["uptimeSeconds"].is_u64());
    assert!(body["data"]["timestamp"].is_string());
    assert_eq!(body["data"]["storage"]["total"]["count"], 0);
}

#[tokio::test]
async fn storage_reports_per_role_counts_and_bytes() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/convert")
        .multipart(single_upload("photo.png", png_bytes(24, 24)))
        .await;
    response.assert_status_ok();

    let response = app.server.get("/api/storage").await;
    response.assert_status_ok();

    let body: Value = response.json();
    let storage = &body["data"];
    assert_eq!(storage["staging"]["count"], 0);
    assert_eq!(storage["converted"]["count"], 1);
    assert!(storage["converted"]["sizeBytes"].as_u64().unwrap() > 0);
    assert_eq!(storage["batch"]["count"], 0);
    assert_eq!(storage["total"]["count"], 1);
    assert!(storage["converted"]["size"].is_string());
}

#[tokio::test]
async fn cleanup_force_sweeps_with_override_ttl() {
    // Forced sweeps use a zero TTL here so everything qualifies immediately
    let app = spawn_app_with(|config| {
        config.forced_sweep_ttl = Duration::ZERO;
    })
    .await;

    let response = app
        .server
        .post("/api/convert")
        .multipart(single_upload("photo.png", png_bytes(24, 24)))
        .await;
    response.assert_status_ok();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let response = app.server.post("/api/cleanup").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["removedEntries"], 1);
    assert_ne!(body["data"]["cleaned"]["converted"], "0 Bytes");
    assert_eq!(body["data"]["current"]["total"]["count"], 0);

    // The converted file is gone
    let download = app.server.get("/api/storage").await;
    assert_eq!(download.json::<Value>()["data"]["converted"]["count"], 0);
}

#[tokio::test]
async fn cleanup_retains_fresh_files_with_normal_ttl() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/convert")
        .multipart(single_upload("photo.png", png_bytes(24, 24)))
        .await;
    response.assert_status_ok();

    // Default forced TTL is 5 minutes; a just-created file survives
    let response = app.server.post("/api/cleanup").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["removedEntries"], 0);
    assert_eq!(body["data"]["current"]["converted"]["count"], 1);
}

#[tokio::test]
async fn unknown_routes_get_the_error_envelope() {
    let app = spawn_app().await;

    let response = app.server.get("/api/nope").await;
    response.assert_status_not_found();

    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Endpoint not found");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = spawn_app().await;

    let response = app.server.get("/api-docs/openapi.json").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert!(body["paths"]["/api/convert"].is_object());
    assert!(body["paths"]["/api/batch-convert"].is_object());
}
