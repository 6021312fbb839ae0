// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection provider abstraction
//!
//! A provider wraps one model runtime. Providers disagree on what they
//! return, so inference yields a [`ModelOutput`] and the normalizer maps
//! each variant into the canonical detection record.

use std::collections::HashMap;

use image::DynamicImage;
use thiserror::Error;

/// Errors raised by a provider during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    /// The provider does not accept per-call thresholds
    #[error("provider does not accept inference parameters: {0}")]
    UnsupportedParams(String),

    #[error("inference failed: {0}")]
    Runtime(String),
}

impl From<anyhow::Error> for InferenceError {
    fn from(err: anyhow::Error) -> Self {
        InferenceError::Runtime(format!("{:#}", err))
    }
}

/// Per-call thresholds passed to a provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InferenceParams {
    /// Minimum confidence for a candidate box
    pub confidence: f32,
    /// IoU threshold for non-maximum suppression
    pub iou: f32,
}

/// One box as reported by a box-object provider
#[derive(Debug, Clone, PartialEq)]
pub struct PredictedBox {
    /// Corner coordinates `[x1, y1, x2, y2]` in original image pixels
    pub xyxy: [f32; 4],
    pub confidence: f32,
    pub class_id: usize,
}

/// Raw result of a provider call
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutput {
    /// Box objects with a class-id keyed name table
    Boxes {
        boxes: Vec<PredictedBox>,
        names: HashMap<usize, String>,
    },
    /// Rows of `(x1, y1, x2, y2, confidence, class_id)` with a positional name table
    TensorRows {
        rows: Vec<[f32; 6]>,
        names: Vec<String>,
    },
    /// The runtime produced something neither mapping understands
    Unrecognized { description: String },
}

/// A loaded detection model
pub trait DetectionProvider: Send + Sync {
    /// Short provider name for logs and health output
    fn name(&self) -> &str;

    /// Run the model on an RGB image.
    ///
    /// `params` of `None` means a bare call that uses the provider's own
    /// defaults.
    fn infer(
        &self,
        image: &DynamicImage,
        params: Option<&InferenceParams>,
    ) -> Result<ModelOutput, InferenceError>;

    /// Prime the runtime with a throwaway inference
    fn warm_up(&self) -> Result<(), InferenceError> {
        Ok(())
    }
}
