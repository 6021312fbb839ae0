// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared fixtures for the API tests: mock providers, loaders and request helpers
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, Response},
    Router,
};
use base64::Engine;
use esp32_vision_node::{
    api::{create_app, AppState},
    vision::detection::{
        DetectionProvider, InferenceError, InferenceParams, ModelOutput, PredictedBox,
    },
    vision::ProviderLoader,
};
use image::DynamicImage;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::util::ServiceExt;

/// Boxes every mock reports: (xyxy, confidence, class id)
pub const MOCK_BOXES: [([f32; 4], f32, usize); 3] = [
    ([12.0, 8.0, 40.0, 60.0], 0.95, 0),
    ([20.0, 20.0, 30.0, 30.0], 0.61, 2),
    ([0.0, 0.0, 5.0, 5.0], 0.30, 0),
];

pub fn names() -> Vec<String> {
    vec!["person".to_string(), "bicycle".to_string(), "car".to_string()]
}

/// Which result shape a mock provider reports
#[derive(Debug, Clone, Copy)]
pub enum MockShape {
    /// Box objects; accepts parameters but ignores the threshold
    Boxes,
    /// Raw rows; rejects parameters
    Rows,
}

pub struct MockProvider {
    pub name: &'static str,
    pub shape: MockShape,
}

impl DetectionProvider for MockProvider {
    fn name(&self) -> &str {
        self.name
    }

    fn infer(
        &self,
        _image: &DynamicImage,
        params: Option<&InferenceParams>,
    ) -> Result<ModelOutput, InferenceError> {
        match self.shape {
            MockShape::Boxes => Ok(ModelOutput::Boxes {
                boxes: MOCK_BOXES
                    .iter()
                    .map(|(xyxy, confidence, class_id)| PredictedBox {
                        xyxy: *xyxy,
                        confidence: *confidence,
                        class_id: *class_id,
                    })
                    .collect(),
                names: names().into_iter().enumerate().collect::<HashMap<_, _>>(),
            }),
            MockShape::Rows => {
                if params.is_some() {
                    return Err(InferenceError::UnsupportedParams("mock".to_string()));
                }
                Ok(ModelOutput::TensorRows {
                    rows: MOCK_BOXES
                        .iter()
                        .map(|(b, c, id)| [b[0], b[1], b[2], b[3], *c, *id as f32])
                        .collect(),
                    names: names(),
                })
            }
        }
    }
}

/// Loader that counts its calls and either fails or yields a [`MockProvider`]
pub struct CountingLoader {
    pub name: &'static str,
    pub shape: Option<MockShape>,
    pub calls: AtomicUsize,
}

impl CountingLoader {
    pub fn ok(name: &'static str, shape: MockShape) -> Arc<Self> {
        Arc::new(Self {
            name,
            shape: Some(shape),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            shape: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ProviderLoader for CountingLoader {
    fn name(&self) -> &str {
        self.name
    }

    fn load(&self) -> anyhow::Result<Arc<dyn DetectionProvider>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Slow enough for concurrent first callers to overlap
        std::thread::sleep(std::time::Duration::from_millis(20));
        match self.shape {
            Some(shape) => Ok(Arc::new(MockProvider {
                name: self.name,
                shape,
            })),
            None => anyhow::bail!("{} weights not found", self.name),
        }
    }
}

pub fn state_with(loaders: &[&Arc<CountingLoader>]) -> AppState {
    AppState::new_for_test(
        loaders
            .iter()
            .map(|l| Arc::clone(*l) as Arc<dyn ProviderLoader>)
            .collect(),
    )
}

/// Small solid-colour PNG, base64-encoded without a prefix
pub fn png_base64(width: u32, height: u32) -> String {
    let image = image::RgbImage::from_pixel(width, height, image::Rgb([120, 30, 200]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Uncompressed BMP of noisy pixels, base64-encoded without a prefix
pub fn bmp_base64(width: u32, height: u32) -> String {
    let image = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x ^ y) % 256) as u8])
    });
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Bmp)
        .unwrap();
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

pub fn json_request(method: Method, uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

/// POST with no `Content-Type` header
pub fn untyped_post(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(body.into())
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn app(state: AppState) -> Router {
    create_app(state)
}
