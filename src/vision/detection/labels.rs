// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Class-name tables for the detection providers

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// The 80 COCO classes the stock YOLO weights are trained on
pub const COCO_CLASSES: [&str; 80] = [
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "stop sign", "parking meter", "bench", "bird", "cat", "dog",
    "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "backpack", "umbrella",
    "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball", "kite",
    "baseball bat", "baseball glove", "skateboard", "surfboard", "tennis racket", "bottle",
    "wine glass", "cup", "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich", "orange",
    "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "couch", "potted plant",
    "bed", "dining table", "toilet", "tv", "laptop", "mouse", "remote", "keyboard", "cell phone",
    "microwave", "oven", "toaster", "sink", "refrigerator", "book", "clock", "vase", "scissors",
    "teddy bear", "hair drier", "toothbrush",
];

/// Built-in COCO table as owned strings
pub fn coco_names() -> Vec<String> {
    COCO_CLASSES.iter().map(|s| s.to_string()).collect()
}

/// Read a labels file with one class name per line
///
/// Blank lines are skipped; line order defines the class ids.
pub fn load_labels_file(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read labels file {}", path.display()))?;

    let names: Vec<String> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();

    if names.is_empty() {
        anyhow::bail!("Labels file {} is empty", path.display());
    }

    Ok(names)
}

/// Parse the `names` metadata entry written by Ultralytics exports
///
/// The value is a Python dict literal such as
/// `{0: 'person', 1: 'bicycle', 2: "traffic light"}`.
pub fn parse_names_metadata(raw: &str) -> Result<HashMap<usize, String>> {
    let body = raw
        .trim()
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .context("names metadata is not a dict literal")?;

    let mut names = HashMap::new();
    let mut rest = body.trim();

    while !rest.is_empty() {
        let (key, after_key) = rest
            .split_once(':')
            .context("names metadata entry is missing ':'")?;
        let class_id: usize = key
            .trim()
            .parse()
            .with_context(|| format!("invalid class id '{}' in names metadata", key.trim()))?;

        let value = after_key.trim_start();
        let quote = value
            .chars()
            .next()
            .filter(|c| *c == '\'' || *c == '"')
            .context("names metadata value is not quoted")?;
        let value = &value[1..];
        let end = value
            .find(quote)
            .context("names metadata value is not terminated")?;

        names.insert(class_id, value[..end].to_string());

        rest = value[end + 1..].trim_start();
        rest = rest.strip_prefix(',').unwrap_or(rest).trim_start();
    }

    if names.is_empty() {
        anyhow::bail!("names metadata is empty");
    }

    Ok(names)
}
