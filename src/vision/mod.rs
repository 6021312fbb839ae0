// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module
//!
//! This module provides:
//! - Base64 image decoding
//! - YOLO object detection with a lazily loaded, two-provider model

pub mod detection;
pub mod image_utils;
pub mod model_manager;

pub use detection::{Detection, DetectionProvider, DetectionThresholds};
pub use image_utils::{decode_base64_image, decode_image_bytes, detect_format, ImageError, ImageInfo};
pub use model_manager::{
    DetectionModelConfig, DetectionModelManager, HubLoader, ModelLoadError, ProviderLoader,
    UltralyticsLoader,
};
