// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::http_server::AppState;
use crate::version::VERSION_NUMBER;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelStatus {
    pub loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model: ModelStatus,
    pub mailbox_updated_at: Option<DateTime<Utc>>,
}

/// GET /health - Liveness plus model and mailbox state
///
/// Never triggers a model load.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: VERSION_NUMBER.to_string(),
        model: ModelStatus {
            loaded: state.model_manager.is_loaded(),
            provider: state.model_manager.provider_name(),
        },
        mailbox_updated_at: state.mailbox.updated_at().await,
    })
}
