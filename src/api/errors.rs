// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{error, warn};

use crate::vision::detection::InferenceError;
use crate::vision::{ImageError, ModelLoadError};

/// Body of every error response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Malformed base64 or image bytes
    ImageDecode(String),
    ModelUnavailable(String),
    ValidationError {
        field: String,
        message: String,
    },
    /// Body is not valid JSON
    InvalidRequest(String),
    InternalError(String),
}

impl ApiError {
    /// Message placed in the `error` field
    pub fn message(&self) -> String {
        match self {
            ApiError::ImageDecode(msg) => msg.clone(),
            ApiError::ModelUnavailable(msg) => msg.clone(),
            ApiError::ValidationError { message, .. } => message.clone(),
            ApiError::InvalidRequest(msg) => msg.clone(),
            ApiError::InternalError(msg) => format!("Unexpected error: {}", msg),
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.message(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidRequest(_) | ApiError::ValidationError { .. } => 400,
            ApiError::ImageDecode(_)
            | ApiError::ModelUnavailable(_)
            | ApiError::InternalError(_) => 500,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::ImageDecode(msg) => write!(f, "Image decode failed: {}", msg),
            ApiError::ModelUnavailable(msg) => write!(f, "Model unavailable: {}", msg),
            ApiError::ValidationError { field, message } => {
                write!(f, "Validation error for {}: {}", field, message)
            }
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!("{}", self);
        } else {
            warn!("{}", self);
        }

        (status, Json(self.to_response())).into_response()
    }
}

impl From<ImageError> for ApiError {
    fn from(err: ImageError) -> Self {
        ApiError::ImageDecode(err.to_string())
    }
}

impl From<ModelLoadError> for ApiError {
    fn from(err: ModelLoadError) -> Self {
        ApiError::ModelUnavailable(err.to_string())
    }
}

impl From<InferenceError> for ApiError {
    fn from(err: InferenceError) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}
