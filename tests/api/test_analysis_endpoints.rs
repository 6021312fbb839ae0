// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! /update_analysis and /latest_analysis tests

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use super::support::{app, body_json, get, json_request, send, state_with};

#[tokio::test]
async fn test_latest_analysis_empty_before_update() {
    let app = app(state_with(&[]));

    let response = send(&app, get("/latest_analysis")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({}));
}

#[tokio::test]
async fn test_update_then_read_returns_exact_body() {
    let app = app(state_with(&[]));
    let analysis = json!({
        "scene": "kitchen",
        "objects": [{"label": "cup", "count": 2}],
        "nested": {"ok": true, "score": 0.5}
    });

    let response = send(
        &app,
        json_request(Method::POST, "/update_analysis", analysis.to_string()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"status": "success"}));

    let response = send(&app, get("/latest_analysis")).await;
    assert_eq!(body_json(response).await, analysis);
}

#[tokio::test]
async fn test_last_write_wins() {
    let app = app(state_with(&[]));

    for body in [json!({"first": 1}), json!({"second": 2})] {
        send(&app, json_request(Method::POST, "/update_analysis", body.to_string())).await;
    }

    let response = send(&app, get("/latest_analysis")).await;
    assert_eq!(body_json(response).await, json!({"second": 2}));
}

#[tokio::test]
async fn test_any_json_value_is_stored() {
    let app = app(state_with(&[]));

    for body in [json!([1, 2, 3]), json!("just text"), json!(42), Value::Null] {
        let response = send(
            &app,
            json_request(Method::POST, "/update_analysis", body.to_string()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, get("/latest_analysis")).await;
        assert_eq!(body_json(response).await, body);
    }
}

#[tokio::test]
async fn test_invalid_json_is_rejected_and_mailbox_unchanged() {
    let app = app(state_with(&[]));
    send(
        &app,
        json_request(Method::POST, "/update_analysis", r#"{"kept": true}"#),
    )
    .await;

    let response = send(&app, json_request(Method::POST, "/update_analysis", "{oops")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());

    let response = send(&app, get("/latest_analysis")).await;
    assert_eq!(body_json(response).await, json!({"kept": true}));
}
