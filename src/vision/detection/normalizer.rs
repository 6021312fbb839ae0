// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection normalizer
//!
//! Drives a provider and maps whichever [`ModelOutput`] it returns into the
//! canonical [`Detection`] list. The minimum-confidence filter is applied
//! here for every shape, regardless of what the provider did with the
//! thresholds it was given.

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use super::provider::{DetectionProvider, InferenceError, InferenceParams, ModelOutput, PredictedBox};

/// One recognized object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// `[x1, y1, x2, y2]` in original image pixels
    pub bbox: [f32; 4],
    pub label: String,
    pub confidence: f32,
}

/// Thresholds applied to every detection request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionThresholds {
    pub min_confidence: f32,
    pub iou: f32,
}

impl Default for DetectionThresholds {
    fn default() -> Self {
        Self {
            min_confidence: 0.6,
            iou: 0.45,
        }
    }
}

/// Which provider result shape produced a detection list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    Boxes,
    TensorRows,
    Unrecognized,
}

/// Detections plus the shape they were read from
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionOutcome {
    pub detections: Vec<Detection>,
    pub shape: ResultShape,
}

/// Run `model` on `image` and normalize the result
///
/// The thresholds are offered to the provider first. A provider that
/// rejects them with [`InferenceError::UnsupportedParams`] is called again
/// bare. Any other inference error is returned.
pub fn run_detection(
    model: &dyn DetectionProvider,
    image: &DynamicImage,
    thresholds: &DetectionThresholds,
) -> Result<DetectionOutcome, InferenceError> {
    let params = InferenceParams {
        confidence: thresholds.min_confidence,
        iou: thresholds.iou,
    };

    let output = match model.infer(image, Some(&params)) {
        Ok(output) => output,
        Err(InferenceError::UnsupportedParams(reason)) => {
            debug!(provider = model.name(), %reason, "Retrying inference without parameters");
            model.infer(image, None)?
        }
        Err(e) => return Err(e),
    };

    let outcome = normalize(output, thresholds.min_confidence);
    if outcome.shape == ResultShape::Unrecognized {
        warn!(
            provider = model.name(),
            "Unrecognized detection result shape, returning no detections"
        );
    }

    Ok(outcome)
}

/// Run `model` on `image` and return only the detection list
pub fn detect(
    model: &dyn DetectionProvider,
    image: &DynamicImage,
    thresholds: &DetectionThresholds,
) -> Result<Vec<Detection>, InferenceError> {
    run_detection(model, image, thresholds).map(|outcome| outcome.detections)
}

/// Map a provider result into detections at or above `min_confidence`
pub fn normalize(output: ModelOutput, min_confidence: f32) -> DetectionOutcome {
    match output {
        ModelOutput::Boxes { boxes, names } => DetectionOutcome {
            detections: from_boxes(&boxes, &names, min_confidence),
            shape: ResultShape::Boxes,
        },
        ModelOutput::TensorRows { rows, names } => DetectionOutcome {
            detections: from_rows(&rows, &names, min_confidence),
            shape: ResultShape::TensorRows,
        },
        ModelOutput::Unrecognized { description } => {
            debug!(%description, "Discarding unrecognized model output");
            DetectionOutcome {
                detections: Vec::new(),
                shape: ResultShape::Unrecognized,
            }
        }
    }
}

fn from_boxes(
    boxes: &[PredictedBox],
    names: &HashMap<usize, String>,
    min_confidence: f32,
) -> Vec<Detection> {
    boxes
        .iter()
        .filter_map(|b| {
            let label = names
                .get(&b.class_id)
                .cloned()
                .unwrap_or_else(|| b.class_id.to_string());
            make_detection(b.xyxy, b.confidence, label, min_confidence)
        })
        .collect()
}

fn from_rows(rows: &[[f32; 6]], names: &[String], min_confidence: f32) -> Vec<Detection> {
    rows.iter()
        .filter_map(|row| {
            let [x1, y1, x2, y2, confidence, class_id] = *row;
            if !class_id.is_finite() {
                return None;
            }

            let class_id = class_id as i64;
            let label = usize::try_from(class_id)
                .ok()
                .and_then(|id| names.get(id).cloned())
                .unwrap_or_else(|| class_id.to_string());
            make_detection([x1, y1, x2, y2], confidence, label, min_confidence)
        })
        .collect()
}

fn make_detection(
    xyxy: [f32; 4],
    confidence: f32,
    label: String,
    min_confidence: f32,
) -> Option<Detection> {
    if !confidence.is_finite() || confidence < min_confidence {
        return None;
    }
    if xyxy.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let [x1, y1, x2, y2] = xyxy;
    let bbox = [x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2)];
    // Boxes clamped flat against an image edge carry no area
    if bbox[2] - bbox[0] <= 0.0 || bbox[3] - bbox[1] <= 0.0 {
        return None;
    }
    Some(Detection {
        bbox,
        label,
        confidence,
    })
}
