// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Mailbox endpoint handlers

use axum::extract::rejection::JsonRejection;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::api::errors::ApiError;
use crate::api::http_server::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateAnalysisResponse {
    pub status: String,
}

/// POST /update_analysis - Store any JSON body as the latest analysis
pub async fn update_analysis_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<UpdateAnalysisResponse>, ApiError> {
    let Json(value) = payload?;
    debug!("Analysis updated ({} bytes)", value.to_string().len());

    state.mailbox.replace(value).await;

    Ok(Json(UpdateAnalysisResponse {
        status: "success".to_string(),
    }))
}

/// GET /latest_analysis - Last stored analysis, or `{}` before any update
pub async fn latest_analysis_handler(State(state): State<AppState>) -> Json<Value> {
    Json(state.mailbox.latest().await)
}
