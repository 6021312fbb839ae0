// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection request types and validation

use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;

/// Message returned when the `image` field is absent or blank
pub const IMAGE_REQUIRED: &str = "image is required (base64 JPEG without prefix)";

/// Request for object detection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectRequest {
    /// Base64-encoded image data; a `data:` URL prefix is tolerated
    #[serde(default)]
    pub image: Option<String>,
}

impl DetectRequest {
    /// Validate the request and hand back the image payload
    pub fn validate(&self) -> Result<&str, ApiError> {
        match self.image.as_deref().map(str::trim) {
            Some(image) if !image.is_empty() => Ok(image),
            _ => Err(ApiError::ValidationError {
                field: "image".to_string(),
                message: IMAGE_REQUIRED.to_string(),
            }),
        }
    }
}
