// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for YOLO models

use image::{imageops::FilterType, DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

/// Square input size expected by the exported YOLO models
pub const YOLO_INPUT_SIZE: u32 = 640;

/// Gray value YOLO uses for letterbox padding
const PAD_VALUE: u8 = 114;

/// How an original image was mapped into the model input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterboxParams {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
    pub orig_width: u32,
    pub orig_height: u32,
}

impl LetterboxParams {
    /// Map a box from model-input space back to original image pixels,
    /// clamped to the image bounds.
    pub fn to_original(&self, xyxy: [f32; 4]) -> [f32; 4] {
        let scale = if self.scale > f32::EPSILON { self.scale } else { 1.0 };
        let max_x = self.orig_width as f32;
        let max_y = self.orig_height as f32;

        [
            ((xyxy[0] - self.pad_x) / scale).clamp(0.0, max_x),
            ((xyxy[1] - self.pad_y) / scale).clamp(0.0, max_y),
            ((xyxy[2] - self.pad_x) / scale).clamp(0.0, max_x),
            ((xyxy[3] - self.pad_y) / scale).clamp(0.0, max_y),
        ]
    }
}

/// Preprocess an image for YOLO detection
///
/// Steps:
/// 1. Resize with aspect ratio preservation to `target_size`
/// 2. Center on a gray (114) square canvas
/// 3. Scale pixels to [0, 1]
/// 4. Convert to NCHW tensor format [1, 3, H, W]
pub fn letterbox(image: &DynamicImage, target_size: u32) -> (Array4<f32>, LetterboxParams) {
    let (orig_w, orig_h) = image.dimensions();

    let mut canvas = RgbImage::from_pixel(
        target_size,
        target_size,
        Rgb([PAD_VALUE, PAD_VALUE, PAD_VALUE]),
    );

    let params = if orig_w == 0 || orig_h == 0 {
        LetterboxParams {
            scale: 1.0,
            pad_x: 0.0,
            pad_y: 0.0,
            orig_width: orig_w,
            orig_height: orig_h,
        }
    } else {
        let scale = (target_size as f32 / orig_w as f32).min(target_size as f32 / orig_h as f32);
        let new_w = ((orig_w as f32 * scale).round() as u32).clamp(1, target_size);
        let new_h = ((orig_h as f32 * scale).round() as u32).clamp(1, target_size);

        let resized = image.resize_exact(new_w, new_h, FilterType::Triangle).to_rgb8();

        let pad_x = (target_size - new_w) / 2;
        let pad_y = (target_size - new_h) / 2;
        image::imageops::overlay(&mut canvas, &resized, pad_x as i64, pad_y as i64);

        LetterboxParams {
            scale,
            pad_x: pad_x as f32,
            pad_y: pad_y as f32,
            orig_width: orig_w,
            orig_height: orig_h,
        }
    };

    let size = target_size as usize;
    let mut tensor = Array4::zeros((1, 3, size, size));
    for (x, y, pixel) in canvas.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
        }
    }

    (tensor, params)
}

/// Blank input used to warm up a session
pub fn blank_input(target_size: u32) -> Array4<f32> {
    Array4::zeros((1, 3, target_size as usize, target_size as usize))
}
