// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Plain-runtime detection provider
//!
//! Runs a classic YOLOv5 ONNX export on the CPU with fixed thresholds and
//! reports raw `(x1, y1, x2, y2, confidence, class_id)` rows. Class names
//! come from a separate labels table because these exports carry none.

use anyhow::Result;
use image::DynamicImage;
use ndarray::{ArrayD, Axis, Ix2};
use ort::session::Session;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

use super::postprocessing::{
    classify_head, decode_anchor_based, non_max_suppression, refine_rows_layout, HeadLayout,
};
use super::preprocessing::{blank_input, letterbox, LetterboxParams, YOLO_INPUT_SIZE};
use super::provider::{DetectionProvider, InferenceError, InferenceParams, ModelOutput};
use super::session::{build_session, input_name, run_single, Accelerator};

/// Fixed confidence threshold applied inside the provider
pub const HUB_CONFIDENCE: f32 = 0.25;

/// Fixed IoU threshold applied inside the provider
pub const HUB_IOU: f32 = 0.45;

pub struct HubDetector {
    session: Mutex<Session>,
    input_name: String,
    names: Vec<String>,
}

impl std::fmt::Debug for HubDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubDetector")
            .field("input_name", &self.input_name)
            .field("classes", &self.names.len())
            .finish_non_exhaustive()
    }
}

impl HubDetector {
    /// Load a YOLOv5 ONNX export on the CPU execution provider
    pub fn load(model_path: &Path, names: Vec<String>) -> Result<Self> {
        let session = build_session(model_path, Accelerator::CpuOnly)?;
        let input_name = input_name(&session);

        info!(
            "Hub detector ready: {} class names, input '{}'",
            names.len(),
            input_name
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            names,
        })
    }
}

fn map_row(row: [f32; 6], letterbox: &LetterboxParams) -> [f32; 6] {
    let [x1, y1, x2, y2] = letterbox.to_original([row[0], row[1], row[2], row[3]]);
    [x1, y1, x2, y2, row[4], row[5]]
}

/// Turn a raw output tensor into six-number rows in original image pixels
pub(crate) fn rows_from_output(output: &ArrayD<f32>, letterbox: &LetterboxParams) -> Option<Vec<[f32; 6]>> {
    let layout = classify_head(output.shape())?;

    let head = if output.ndim() == 3 {
        output.index_axis(Axis(0), 0)
    } else {
        output.view()
    };
    let head = head.into_dimensionality::<Ix2>().ok()?;
    let layout = match layout {
        HeadLayout::Rows => refine_rows_layout(head.view()),
        other => other,
    };

    match layout {
        HeadLayout::AnchorBased { .. } => {
            let candidates = decode_anchor_based(head, HUB_CONFIDENCE);
            let kept = non_max_suppression(candidates, HUB_IOU);
            Some(
                kept.into_iter()
                    .map(|b| {
                        map_row(
                            [
                                b.xyxy[0],
                                b.xyxy[1],
                                b.xyxy[2],
                                b.xyxy[3],
                                b.confidence,
                                b.class_id as f32,
                            ],
                            letterbox,
                        )
                    })
                    .collect(),
            )
        }
        HeadLayout::Rows => Some(
            head.rows()
                .into_iter()
                .map(|r| map_row([r[0], r[1], r[2], r[3], r[4], r[5]], letterbox))
                .collect(),
        ),
        HeadLayout::AnchorFree { .. } => None,
    }
}

impl DetectionProvider for HubDetector {
    fn name(&self) -> &str {
        "hub"
    }

    fn infer(
        &self,
        image: &DynamicImage,
        params: Option<&InferenceParams>,
    ) -> Result<ModelOutput, InferenceError> {
        if params.is_some() {
            return Err(InferenceError::UnsupportedParams(
                "hub provider applies fixed thresholds".to_string(),
            ));
        }

        let (input, lb) = letterbox(image, YOLO_INPUT_SIZE);
        let output = run_single(&self.session, &self.input_name, input)?;

        match rows_from_output(&output, &lb) {
            Some(rows) => {
                debug!("Hub detector produced {} rows", rows.len());
                Ok(ModelOutput::TensorRows {
                    rows,
                    names: self.names.clone(),
                })
            }
            None => Ok(ModelOutput::Unrecognized {
                description: format!("YOLOv5 head expected, got shape {:?}", output.shape()),
            }),
        }
    }

    fn warm_up(&self) -> Result<(), InferenceError> {
        run_single(&self.session, &self.input_name, blank_input(YOLO_INPUT_SIZE))?;
        Ok(())
    }
}
