// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! GET / page rendering tests

use axum::http::{header, StatusCode};
use esp32_vision_node::{
    api::AppState,
    config::NodeConfig,
    vision::DetectionModelManager,
};

use super::support::{app, body_bytes, get, send, state_with};

async fn page(app: &axum::Router, uri: &str) -> String {
    let response = send(app, get(uri)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    String::from_utf8(body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn test_index_uses_default_host() {
    let html = page(&app(state_with(&[])), "/").await;
    assert!(html.contains("data-esp32-host=\"192.168.0.100\""));
}

#[tokio::test]
async fn test_index_uses_configured_host() {
    let config = NodeConfig {
        esp32_host: "10.1.2.3".to_string(),
        ..NodeConfig::default()
    };
    let state = AppState::with_model_manager(config, DetectionModelManager::with_loaders(vec![]));

    let html = page(&app(state), "/").await;
    assert!(html.contains("data-esp32-host=\"10.1.2.3\""));
}

#[tokio::test]
async fn test_index_query_overrides_config() {
    let html = page(&app(state_with(&[])), "/?esp32url=172.16.0.42").await;
    assert!(html.contains("data-esp32-host=\"172.16.0.42\""));
    assert!(!html.contains("192.168.0.100"));
}

#[tokio::test]
async fn test_index_escapes_query_value() {
    let html = page(
        &app(state_with(&[])),
        "/?esp32url=%22%3E%3Cscript%3Ealert(1)%3C%2Fscript%3E",
    )
    .await;
    assert!(!html.contains("<script>alert(1)"));
}

#[tokio::test]
async fn test_index_does_not_load_model() {
    let state = state_with(&[]);
    let app = app(state.clone());
    page(&app, "/").await;
    assert!(!state.model_manager.is_loaded());
}

#[tokio::test]
async fn test_index_repeated_query_uses_first_value() {
    let html = page(
        &app(state_with(&[])),
        "/?esp32url=10.0.0.1&esp32url=10.0.0.2",
    )
    .await;
    assert!(html.contains("data-esp32-host=\"10.0.0.1\""));
    assert!(!html.contains("10.0.0.2"));
}

#[tokio::test]
async fn test_index_odd_query_falls_back_to_config() {
    for uri in ["/?esp32url", "/?esp32url=&esp32url=10.0.0.2", "/?%zz&other=1"] {
        let html = page(&app(state_with(&[])), uri).await;
        assert!(html.contains("data-esp32-host=\"192.168.0.100\""), "{}", uri);
    }
}
