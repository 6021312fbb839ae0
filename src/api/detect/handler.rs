// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection endpoint handler

use axum::body::Bytes;
use axum::{extract::State, Json};
use tracing::{debug, info};

use super::request::DetectRequest;
use super::response::DetectResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::vision::decode_base64_image;
use crate::vision::detection::run_detection;

/// POST /detect - Detect objects in an image
///
/// # Request
/// - `image`: Base64-encoded image data (required)
///
/// The body is parsed as JSON whatever its `Content-Type`; camera
/// firmware often posts without one.
///
/// # Response
/// - `detections`: `[{bbox: [x1, y1, x2, y2], label, confidence}]`, every
///   entry at or above the configured minimum confidence
///
/// # Errors
/// - 400 Bad Request: body is not JSON, or `image` is missing or empty
/// - 500 Internal Server Error: image cannot be decoded, no model could be
///   loaded, or inference failed
pub async fn detect_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<DetectResponse>, ApiError> {
    let request: DetectRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::InvalidRequest(format!("Invalid JSON body: {}", e)))?;
    let image_data = request.validate()?.to_string();

    let (image, image_info) = tokio::task::spawn_blocking(move || decode_base64_image(&image_data))
        .await
        .map_err(|e| ApiError::InternalError(e.to_string()))??;

    debug!(
        "Decoded image: {}x{}, {} bytes",
        image_info.width, image_info.height, image_info.size_bytes
    );

    let model = state.model_manager.get_model().await?;
    let thresholds = state.thresholds;

    let outcome = tokio::task::spawn_blocking(move || {
        run_detection(model.as_ref(), &image, &thresholds)
    })
    .await
    .map_err(|e| ApiError::InternalError(e.to_string()))??;

    info!(
        "Detection complete: {} objects ({:?} output)",
        outcome.detections.len(),
        outcome.shape
    );

    Ok(Json(DetectResponse {
        detections: outcome.detections,
    }))
}
