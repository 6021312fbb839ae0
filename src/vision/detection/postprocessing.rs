// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLO output decoding and non-maximum suppression
//!
//! All boxes produced here are in model-input pixel space; callers map them
//! back through [`LetterboxParams`](super::preprocessing::LetterboxParams).

use ndarray::ArrayView2;
use std::cmp::Ordering;

use super::provider::PredictedBox;

/// Upper bound on boxes kept after suppression
pub const MAX_DETECTIONS: usize = 300;

/// Layout of a raw YOLO output tensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadLayout {
    /// `[1, 4 + classes, anchors]` (YOLOv8 / YOLOv5u exports)
    AnchorFree { num_classes: usize },
    /// `[1, anchors, 5 + classes]` with an objectness column (classic YOLOv5)
    AnchorBased { num_classes: usize },
    /// `[1, n, 6]` or `[n, 6]`, already suppressed; `n` is at most
    /// [`MAX_DETECTIONS`] when batched
    Rows,
}

/// Work out which head produced a tensor of the given shape
pub fn classify_head(shape: &[usize]) -> Option<HeadLayout> {
    match shape {
        [_, 6] => Some(HeadLayout::Rows),
        [1, rows, 6] if *rows <= MAX_DETECTIONS => Some(HeadLayout::Rows),
        [1, features, anchors] if *features > 4 && features < anchors => {
            Some(HeadLayout::AnchorFree {
                num_classes: features - 4,
            })
        }
        [1, anchors, features] if *features > 5 && features < anchors => {
            Some(HeadLayout::AnchorBased {
                num_classes: features - 5,
            })
        }
        _ => None,
    }
}

/// Re-check a [`HeadLayout::Rows`] guess against the tensor contents.
///
/// A one-class anchor-based head has six columns too, but its last column
/// is a class score rather than an integral class id.
pub fn refine_rows_layout(head: ArrayView2<f32>) -> HeadLayout {
    if head.ncols() != 6 {
        return HeadLayout::Rows;
    }
    let scored = head
        .column(5)
        .iter()
        .any(|v| v.is_finite() && v.fract() != 0.0);
    if scored {
        HeadLayout::AnchorBased { num_classes: 1 }
    } else {
        HeadLayout::Rows
    }
}

fn cxcywh_to_xyxy(cx: f32, cy: f32, w: f32, h: f32) -> [f32; 4] {
    [cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0]
}

fn best_class<'a>(scores: impl Iterator<Item = &'a f32>) -> (usize, f32) {
    scores
        .enumerate()
        .fold((0usize, f32::NEG_INFINITY), |(best_idx, best), (idx, &score)| {
            if score > best {
                (idx, score)
            } else {
                (best_idx, best)
            }
        })
}

/// Decode an anchor-free head given as `[4 + classes, anchors]`
pub fn decode_anchor_free(output: ArrayView2<f32>, conf_threshold: f32) -> Vec<PredictedBox> {
    let features = output.shape()[0];
    let anchors = output.shape()[1];
    if features <= 4 {
        return Vec::new();
    }

    let mut candidates = Vec::new();
    for i in 0..anchors {
        let column = output.column(i);
        let (class_id, score) = best_class(column.iter().skip(4));
        if !score.is_finite() || score < conf_threshold {
            continue;
        }

        let (cx, cy, w, h) = (column[0], column[1], column[2], column[3]);
        if !(cx.is_finite() && cy.is_finite() && w > 0.0 && h > 0.0) {
            continue;
        }

        candidates.push(PredictedBox {
            xyxy: cxcywh_to_xyxy(cx, cy, w, h),
            confidence: score,
            class_id,
        });
    }

    candidates
}

/// Decode an anchor-based head given as `[anchors, 5 + classes]`
///
/// Final confidence is objectness times the best class score.
pub fn decode_anchor_based(output: ArrayView2<f32>, conf_threshold: f32) -> Vec<PredictedBox> {
    let anchors = output.shape()[0];
    let features = output.shape()[1];
    if features <= 5 {
        return Vec::new();
    }

    let mut candidates = Vec::new();
    for i in 0..anchors {
        let row = output.row(i);
        let objectness = row[4];
        if !objectness.is_finite() || objectness < conf_threshold {
            continue;
        }

        let (class_id, class_score) = best_class(row.iter().skip(5));
        let score = objectness * class_score;
        if !score.is_finite() || score < conf_threshold {
            continue;
        }

        let (cx, cy, w, h) = (row[0], row[1], row[2], row[3]);
        if !(cx.is_finite() && cy.is_finite() && w > 0.0 && h > 0.0) {
            continue;
        }

        candidates.push(PredictedBox {
            xyxy: cxcywh_to_xyxy(cx, cy, w, h),
            confidence: score,
            class_id,
        });
    }

    candidates
}

/// Intersection over union of two `[x1, y1, x2, y2]` boxes
pub fn iou(a: &[f32; 4], b: &[f32; 4]) -> f32 {
    let ix1 = a[0].max(b[0]);
    let iy1 = a[1].max(b[1]);
    let ix2 = a[2].min(b[2]);
    let iy2 = a[3].min(b[3]);

    let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
    let area_a = (a[2] - a[0]).max(0.0) * (a[3] - a[1]).max(0.0);
    let area_b = (b[2] - b[0]).max(0.0) * (b[3] - b[1]).max(0.0);
    let union = area_a + area_b - inter;

    if union <= 0.0 {
        0.0
    } else {
        inter / union
    }
}

/// Class-aware greedy non-maximum suppression
///
/// Returns survivors sorted by descending confidence, capped at
/// [`MAX_DETECTIONS`].
pub fn non_max_suppression(mut candidates: Vec<PredictedBox>, iou_threshold: f32) -> Vec<PredictedBox> {
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });

    let mut kept: Vec<PredictedBox> = Vec::new();
    for candidate in candidates {
        if kept.len() >= MAX_DETECTIONS {
            break;
        }
        let suppressed = kept.iter().any(|k| {
            k.class_id == candidate.class_id && iou(&k.xyxy, &candidate.xyxy) > iou_threshold
        });
        if !suppressed {
            kept.push(candidate);
        }
    }

    kept
}
