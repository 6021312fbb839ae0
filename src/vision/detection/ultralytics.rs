// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Ultralytics-export detection provider
//!
//! Loads ONNX files exported by the Ultralytics tooling. These carry their
//! class table in the `names` metadata entry and emit an anchor-free head,
//! which this provider decodes and suppresses itself before handing back
//! box objects.

use anyhow::{Context, Result};
use image::DynamicImage;
use ndarray::{ArrayD, Axis, Ix2};
use ort::session::Session;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

use super::labels::parse_names_metadata;
use super::postprocessing::{classify_head, decode_anchor_free, non_max_suppression, HeadLayout};
use super::preprocessing::{letterbox, LetterboxParams, YOLO_INPUT_SIZE};
use super::provider::{DetectionProvider, InferenceError, InferenceParams, ModelOutput, PredictedBox};
use super::session::{build_session, custom_metadata, input_name, run_single, Accelerator};

/// Confidence used when the caller passes no parameters
pub const DEFAULT_CONFIDENCE: f32 = 0.25;

/// IoU used when the caller passes no parameters
pub const DEFAULT_IOU: f32 = 0.7;

pub struct UltralyticsDetector {
    session: Mutex<Session>,
    input_name: String,
    names: HashMap<usize, String>,
    model_path: PathBuf,
}

impl std::fmt::Debug for UltralyticsDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UltralyticsDetector")
            .field("input_name", &self.input_name)
            .field("classes", &self.names.len())
            .field("model_path", &self.model_path)
            .finish_non_exhaustive()
    }
}

impl UltralyticsDetector {
    /// Load an Ultralytics ONNX export
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found or ONNX Runtime rejects it
    /// - The model has no `names` metadata (not an Ultralytics export)
    pub fn load(model_path: &Path) -> Result<Self> {
        let session = build_session(model_path, Accelerator::PreferCuda)?;

        let raw_names = custom_metadata(&session, "names").with_context(|| {
            format!(
                "{} has no 'names' metadata; not an Ultralytics export",
                model_path.display()
            )
        })?;
        let names = parse_names_metadata(&raw_names)?;
        let input_name = input_name(&session);

        info!(
            "Ultralytics detector ready: {} classes, input '{}'",
            names.len(),
            input_name
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            names,
            model_path: model_path.to_path_buf(),
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

/// Turn a raw anchor-free output tensor into box objects in original image pixels
pub(crate) fn boxes_from_output(
    output: &ArrayD<f32>,
    letterbox: &LetterboxParams,
    params: &InferenceParams,
) -> Option<Vec<PredictedBox>> {
    match classify_head(output.shape()) {
        Some(HeadLayout::AnchorFree { .. }) => {
            let head = output
                .index_axis(Axis(0), 0)
                .into_dimensionality::<Ix2>()
                .ok()?;
            let candidates = decode_anchor_free(head, params.confidence);
            let kept = non_max_suppression(candidates, params.iou);

            Some(
                kept.into_iter()
                    .map(|b| PredictedBox {
                        xyxy: letterbox.to_original(b.xyxy),
                        ..b
                    })
                    .collect(),
            )
        }
        _ => None,
    }
}

impl DetectionProvider for UltralyticsDetector {
    fn name(&self) -> &str {
        "ultralytics"
    }

    fn infer(
        &self,
        image: &DynamicImage,
        params: Option<&InferenceParams>,
    ) -> Result<ModelOutput, InferenceError> {
        let params = params.copied().unwrap_or(InferenceParams {
            confidence: DEFAULT_CONFIDENCE,
            iou: DEFAULT_IOU,
        });

        let (input, lb) = letterbox(image, YOLO_INPUT_SIZE);
        let output = run_single(&self.session, &self.input_name, input)?;

        match boxes_from_output(&output, &lb, &params) {
            Some(boxes) => {
                debug!("Ultralytics detector produced {} boxes", boxes.len());
                Ok(ModelOutput::Boxes {
                    boxes,
                    names: self.names.clone(),
                })
            }
            None => Ok(ModelOutput::Unrecognized {
                description: format!("anchor-free head expected, got shape {:?}", output.shape()),
            }),
        }
    }
}
