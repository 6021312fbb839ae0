// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection model manager
//!
//! Obtains a detection model handle from the first provider that loads and
//! caches it for the life of the process. Loading is lazy: nothing touches
//! the weights until the first `/detect` request.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::vision::detection::hub::HubDetector;
use crate::vision::detection::labels::{coco_names, load_labels_file};
use crate::vision::detection::provider::DetectionProvider;
use crate::vision::detection::ultralytics::UltralyticsDetector;

/// Primary weights filename, looked up in the model directory
pub const PRIMARY_WEIGHTS: &str = "yolov5s.onnx";

/// Weights filename the ultralytics provider falls back to
pub const ALTERNATE_WEIGHTS: &str = "yolov5su.onnx";

/// Labels file the hub provider looks for next to the weights
pub const DEFAULT_LABELS_FILE: &str = "coco.names";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelLoadError {
    /// Every provider failed; carries the last underlying error
    #[error("detection model unavailable: {0}")]
    Unavailable(String),
}

/// One way of obtaining a detection model
pub trait ProviderLoader: Send + Sync {
    fn name(&self) -> &str;

    /// Load the model. Runs on a blocking thread.
    fn load(&self) -> anyhow::Result<Arc<dyn DetectionProvider>>;
}

/// Where the detection model and its labels live
#[derive(Debug, Clone)]
pub struct DetectionModelConfig {
    /// Directory holding the weights files
    pub model_dir: PathBuf,
    /// Explicit labels file for the hub provider (optional)
    pub labels_path: Option<PathBuf>,
}

impl Default for DetectionModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("."),
            labels_path: None,
        }
    }
}

/// Loads Ultralytics exports, preferring the primary weights file
#[derive(Debug, Clone)]
pub struct UltralyticsLoader {
    model_dir: PathBuf,
}

impl UltralyticsLoader {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
        }
    }

    /// Primary weights if present, else the alternate if present, else the
    /// primary path so the load error names it
    pub fn weights_path(&self) -> PathBuf {
        let primary = self.model_dir.join(PRIMARY_WEIGHTS);
        if primary.exists() {
            return primary;
        }

        let alternate = self.model_dir.join(ALTERNATE_WEIGHTS);
        if alternate.exists() {
            debug!("{} not found, using {}", PRIMARY_WEIGHTS, alternate.display());
            return alternate;
        }

        primary
    }
}

impl ProviderLoader for UltralyticsLoader {
    fn name(&self) -> &str {
        "ultralytics"
    }

    fn load(&self) -> anyhow::Result<Arc<dyn DetectionProvider>> {
        let detector = UltralyticsDetector::load(&self.weights_path())?;
        Ok(Arc::new(detector))
    }
}

/// Loads the primary weights as a plain CPU session with a separate labels table
#[derive(Debug, Clone)]
pub struct HubLoader {
    model_dir: PathBuf,
    labels_path: Option<PathBuf>,
}

impl HubLoader {
    pub fn new(model_dir: impl Into<PathBuf>, labels_path: Option<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            labels_path,
        }
    }

    pub fn weights_path(&self) -> PathBuf {
        self.model_dir.join(PRIMARY_WEIGHTS)
    }

    /// Class names from the configured file, then `coco.names` in the model
    /// directory, then the built-in COCO table
    pub fn resolve_labels(&self) -> anyhow::Result<Vec<String>> {
        if let Some(ref path) = self.labels_path {
            if path.exists() {
                return load_labels_file(path);
            }
            warn!("⚠️ Labels file {} not found", path.display());
        }

        let colocated = self.model_dir.join(DEFAULT_LABELS_FILE);
        if colocated.exists() {
            return load_labels_file(&colocated);
        }

        debug!("Using built-in COCO class names");
        Ok(coco_names())
    }
}

impl ProviderLoader for HubLoader {
    fn name(&self) -> &str {
        "hub"
    }

    fn load(&self) -> anyhow::Result<Arc<dyn DetectionProvider>> {
        let names = self.resolve_labels()?;
        let detector = HubDetector::load(&self.weights_path(), names)?;

        if let Err(e) = detector.warm_up() {
            debug!("Hub detector warm-up failed (ignored): {}", e);
        }

        Ok(Arc::new(detector))
    }
}

fn load_first_available(
    loaders: &[Arc<dyn ProviderLoader>],
) -> Result<Arc<dyn DetectionProvider>, ModelLoadError> {
    let mut last_error = "no detection providers configured".to_string();

    for loader in loaders {
        match loader.load() {
            Ok(model) => {
                info!("✅ Detection model loaded via {} provider", loader.name());
                return Ok(model);
            }
            Err(e) => {
                warn!("⚠️ {} provider failed to load: {:#}", loader.name(), e);
                last_error = format!("{:#}", e);
            }
        }
    }

    Err(ModelLoadError::Unavailable(last_error))
}

/// Owner of the process-wide detection model handle
pub struct DetectionModelManager {
    loaders: Vec<Arc<dyn ProviderLoader>>,
    model: OnceCell<Arc<dyn DetectionProvider>>,
}

impl DetectionModelManager {
    /// Manager with the production provider chain: ultralytics, then hub
    pub fn new(config: DetectionModelConfig) -> Self {
        let loaders: Vec<Arc<dyn ProviderLoader>> = vec![
            Arc::new(UltralyticsLoader::new(config.model_dir.clone())),
            Arc::new(HubLoader::new(config.model_dir, config.labels_path)),
        ];
        Self::with_loaders(loaders)
    }

    /// Manager that tries `loaders` in order
    pub fn with_loaders(loaders: Vec<Arc<dyn ProviderLoader>>) -> Self {
        Self {
            loaders,
            model: OnceCell::new(),
        }
    }

    /// Get the model handle, loading it on first use
    ///
    /// Concurrent first callers share a single load. A failed load is not
    /// cached, so the next call tries the providers again.
    pub async fn get_model(&self) -> Result<Arc<dyn DetectionProvider>, ModelLoadError> {
        self.model
            .get_or_try_init(|| async {
                let loaders = self.loaders.clone();
                tokio::task::spawn_blocking(move || load_first_available(&loaders))
                    .await
                    .map_err(|e| ModelLoadError::Unavailable(format!("model load task failed: {}", e)))?
            })
            .await
            .map(Arc::clone)
    }

    pub fn is_loaded(&self) -> bool {
        self.model.initialized()
    }

    /// Name of the provider that produced the cached handle
    pub fn provider_name(&self) -> Option<String> {
        self.model.get().map(|model| model.name().to_string())
    }

    pub fn provider_chain(&self) -> Vec<String> {
        self.loaders.iter().map(|l| l.name().to_string()).collect()
    }
}

impl std::fmt::Debug for DetectionModelManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectionModelManager")
            .field("providers", &self.provider_chain())
            .field("loaded", &self.provider_name())
            .finish()
    }
}
