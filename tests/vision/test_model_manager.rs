// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Detection model manager tests
//!
//! These tests verify that the DetectionModelManager:
//! - Builds the ultralytics -> hub provider chain from config
//! - Reports the last provider error when no weights can be loaded
//! - Leaves the handle unloaded after a failure so the next call retries

use esp32_vision_node::vision::{
    DetectionModelConfig, DetectionModelManager, HubLoader, ModelLoadError, ProviderLoader,
    UltralyticsLoader,
};
use std::path::PathBuf;

#[cfg(test)]
mod model_manager_tests {
    use super::*;

    // =============================================================================
    // Provider chain
    // =============================================================================

    /// Test 1: Production chain order
    #[test]
    fn test_chain_from_config() {
        let manager = DetectionModelManager::new(DetectionModelConfig {
            model_dir: PathBuf::from("/models"),
            labels_path: None,
        });
        assert_eq!(manager.provider_chain(), vec!["ultralytics", "hub"]);
    }

    /// Test 2: Both providers point at the primary weights by default
    #[test]
    fn test_weights_paths() {
        assert_eq!(
            UltralyticsLoader::new("/models").weights_path(),
            PathBuf::from("/models/yolov5s.onnx")
        );
        assert_eq!(
            HubLoader::new("/models", None).weights_path(),
            PathBuf::from("/models/yolov5s.onnx")
        );
        assert_eq!(UltralyticsLoader::new("/models").name(), "ultralytics");
        assert_eq!(HubLoader::new("/models", None).name(), "hub");
    }

    // =============================================================================
    // Load failures
    // =============================================================================

    /// Test 3: Empty model directory leaves the model unavailable
    #[tokio::test]
    async fn test_missing_weights_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let manager = DetectionModelManager::new(DetectionModelConfig {
            model_dir: dir.path().to_path_buf(),
            labels_path: None,
        });

        let err = manager.get_model().await.err().unwrap();
        let ModelLoadError::Unavailable(message) = err;
        assert!(message.contains("not found"));
        assert!(message.contains("yolov5s.onnx"));
        assert!(!manager.is_loaded());
        assert!(manager.provider_name().is_none());
    }

    /// Test 4: A file ONNX Runtime cannot parse fails both providers
    #[tokio::test]
    async fn test_corrupt_weights_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("yolov5s.onnx"), b"this is not a protobuf").unwrap();

        let manager = DetectionModelManager::new(DetectionModelConfig {
            model_dir: dir.path().to_path_buf(),
            labels_path: None,
        });

        assert!(matches!(
            manager.get_model().await,
            Err(ModelLoadError::Unavailable(_))
        ));
        assert!(!manager.is_loaded());
    }

    /// Test 5: Failure is not cached
    #[tokio::test]
    async fn test_failure_retried_after_weights_appear() {
        let dir = tempfile::tempdir().unwrap();
        let manager = DetectionModelManager::new(DetectionModelConfig {
            model_dir: dir.path().to_path_buf(),
            labels_path: None,
        });

        let first = manager.get_model().await.err().unwrap();
        std::fs::write(dir.path().join("yolov5s.onnx"), b"still not onnx").unwrap();
        let second = manager.get_model().await.err().unwrap();

        // The second attempt found the weights file, so it failed differently
        assert_ne!(first, second);
    }
}
