// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Detection normalizer tests through the public API

use base64::Engine;
use esp32_vision_node::vision::decode_base64_image;
use esp32_vision_node::vision::detection::{
    detect, run_detection, DetectionProvider, DetectionThresholds, InferenceError,
    InferenceParams, ModelOutput, ResultShape,
};
use image::DynamicImage;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Provider that reports a fixed tensor whose shape it does not understand
struct OpaqueProvider;

impl DetectionProvider for OpaqueProvider {
    fn name(&self) -> &str {
        "opaque"
    }

    fn infer(
        &self,
        _image: &DynamicImage,
        _params: Option<&InferenceParams>,
    ) -> Result<ModelOutput, InferenceError> {
        Ok(ModelOutput::Unrecognized {
            description: "shape [1, 32, 160, 160]".to_string(),
        })
    }
}

/// Provider that echoes the image size as one detection per side and
/// ignores the confidence threshold it is given
struct SizeEchoProvider {
    calls: AtomicUsize,
}

impl DetectionProvider for SizeEchoProvider {
    fn name(&self) -> &str {
        "echo"
    }

    fn infer(
        &self,
        image: &DynamicImage,
        params: Option<&InferenceParams>,
    ) -> Result<ModelOutput, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(params.is_some());

        let (w, h) = (image.width() as f32, image.height() as f32);
        Ok(ModelOutput::TensorRows {
            rows: vec![[0.0, 0.0, w, h, 0.9, 0.0], [0.0, 0.0, w / 2.0, h / 2.0, 0.2, 1.0]],
            names: vec!["frame".to_string(), "quarter".to_string()],
        })
    }
}

fn tiny_png() -> DynamicImage {
    let pixel = image::RgbImage::from_pixel(1, 1, image::Rgb([255, 255, 255]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(pixel)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();

    let (image, info) =
        decode_base64_image(&base64::engine::general_purpose::STANDARD.encode(bytes)).unwrap();
    assert_eq!((info.width, info.height), (1, 1));
    image
}

#[test]
fn test_unrecognized_output_is_empty_not_error() {
    let outcome = run_detection(&OpaqueProvider, &tiny_png(), &DetectionThresholds::default()).unwrap();
    assert!(outcome.detections.is_empty());
    assert_eq!(outcome.shape, ResultShape::Unrecognized);
}

#[test]
fn test_threshold_enforced_when_provider_ignores_it() {
    let provider = SizeEchoProvider {
        calls: AtomicUsize::new(0),
    };
    let thresholds = DetectionThresholds {
        min_confidence: 0.5,
        iou: 0.45,
    };

    let detections = detect(&provider, &tiny_png(), &thresholds).unwrap();
    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].label, "frame");
    assert_eq!(detections[0].bbox, [0.0, 0.0, 1.0, 1.0]);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

    let lenient = DetectionThresholds {
        min_confidence: 0.1,
        iou: 0.45,
    };
    assert_eq!(detect(&provider, &tiny_png(), &lenient).unwrap().len(), 2);
}
