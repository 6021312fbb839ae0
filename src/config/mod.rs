// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Node configuration
//!
//! Every setting can come from a command-line flag or an environment
//! variable (a `.env` file is loaded first by the binary).

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::vision::{DetectionModelConfig, DetectionThresholds};

/// Address used when neither the query string nor `ESP32_HOST` names a device
pub const DEFAULT_ESP32_HOST: &str = "192.168.0.100";

/// ESP32 Vision Node
#[derive(Parser, Debug, Clone)]
#[command(name = "esp32-vision-node")]
#[command(about = "YOLO object detection and analysis relay for ESP32 cameras", long_about = None)]
pub struct NodeConfig {
    /// Default ESP32 camera address shown on the index page
    #[arg(long, env = "ESP32_HOST", default_value = DEFAULT_ESP32_HOST)]
    pub esp32_host: String,

    /// Minimum confidence a detection must reach to be reported
    #[arg(long, env = "YOLO_MIN_CONF", default_value_t = 0.6)]
    pub min_confidence: f32,

    /// IoU threshold for non-maximum suppression
    #[arg(long, env = "YOLO_IOU", default_value_t = 0.45)]
    pub iou_threshold: f32,

    /// Directory holding yolov5s.onnx / yolov5su.onnx
    #[arg(long, env = "MODEL_DIR", default_value = ".")]
    pub model_dir: PathBuf,

    /// Class names file (one per line) for plain YOLOv5 exports
    #[arg(long, env = "YOLO_LABELS")]
    pub labels_path: Option<PathBuf>,

    /// Interface to bind the HTTP server on
    #[arg(long, env = "API_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind the HTTP server on
    #[arg(long, env = "API_PORT", default_value_t = 5000)]
    pub port: u16,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            esp32_host: DEFAULT_ESP32_HOST.to_string(),
            min_confidence: 0.6,
            iou_threshold: 0.45,
            model_dir: PathBuf::from("."),
            labels_path: None,
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl NodeConfig {
    /// Check value ranges that clap cannot express
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            anyhow::bail!(
                "min_confidence must be between 0 and 1, got {}",
                self.min_confidence
            );
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            anyhow::bail!(
                "iou_threshold must be between 0 and 1, got {}",
                self.iou_threshold
            );
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid listen address {}:{}: {}", self.host, self.port, e))
    }

    pub fn thresholds(&self) -> DetectionThresholds {
        DetectionThresholds {
            min_confidence: self.min_confidence,
            iou: self.iou_threshold,
        }
    }

    pub fn model_config(&self) -> DetectionModelConfig {
        DetectionModelConfig {
            model_dir: self.model_dir.clone(),
            labels_path: self.labels_path.clone(),
        }
    }
}
