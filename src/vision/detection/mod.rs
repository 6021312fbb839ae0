// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLO object detection
//!
//! Two providers run YOLO exports through ONNX Runtime and report results in
//! different shapes. The normalizer turns either shape into [`Detection`]
//! records.

pub mod hub;
pub mod labels;
pub mod normalizer;
pub mod postprocessing;
pub mod preprocessing;
pub mod provider;
pub mod session;
pub mod ultralytics;

pub use hub::HubDetector;
pub use normalizer::{
    detect, normalize, run_detection, Detection, DetectionOutcome, DetectionThresholds,
    ResultShape,
};
pub use provider::{DetectionProvider, InferenceError, InferenceParams, ModelOutput, PredictedBox};
pub use ultralytics::UltralyticsDetector;
