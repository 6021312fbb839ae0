// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! ONNX Runtime session helpers shared by both providers

use anyhow::{anyhow, Context, Result};
use ndarray::{Array4, ArrayD};
use ort::execution_providers::{CPUExecutionProvider, CUDAExecutionProvider};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Execution provider requested for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accelerator {
    /// Try CUDA first, fall back to CPU
    PreferCuda,
    CpuOnly,
}

fn cpu_session(model_path: &Path) -> Result<Session> {
    Session::builder()
        .context("Failed to create session builder")?
        .with_execution_providers([CPUExecutionProvider::default().build()])
        .context("Failed to set CPU execution provider")?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .context("Failed to set optimization level")?
        .with_intra_threads(4)
        .context("Failed to set intra threads")?
        .commit_from_file(model_path)
        .with_context(|| format!("Failed to load ONNX model from {}", model_path.display()))
}

/// Build a session for the model at `model_path`
pub fn build_session(model_path: &Path, accelerator: Accelerator) -> Result<Session> {
    if !model_path.exists() {
        anyhow::bail!("ONNX model file not found: {}", model_path.display());
    }

    if accelerator == Accelerator::CpuOnly {
        let session = cpu_session(model_path)?;
        info!("✅ Loaded {} (CPU-only)", model_path.display());
        return Ok(session);
    }

    let cuda_result = Session::builder()
        .context("Failed to create session builder")?
        .with_execution_providers([CUDAExecutionProvider::default().build()])
        .context("Failed to set CUDA execution provider")?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .context("Failed to set optimization level")?
        .with_intra_threads(4)
        .context("Failed to set intra threads")?
        .commit_from_file(model_path);

    match cuda_result {
        Ok(session) => {
            info!("✅ Loaded {} with CUDA execution provider", model_path.display());
            Ok(session)
        }
        Err(e) => {
            warn!("⚠️  CUDA execution provider failed: {}", e);
            warn!("   Falling back to CPU execution provider");
            cpu_session(model_path)
        }
    }
}

/// Name of the first model input, or `images` (the YOLO export default)
pub fn input_name(session: &Session) -> String {
    session
        .inputs
        .first()
        .map(|input| input.name.clone())
        .unwrap_or_else(|| "images".to_string())
}

/// Read a custom metadata entry embedded in the model file
pub fn custom_metadata(session: &Session, key: &str) -> Option<String> {
    match session.metadata() {
        Ok(metadata) => metadata.custom(key).ok().flatten(),
        Err(e) => {
            debug!("Model metadata unavailable: {}", e);
            None
        }
    }
}

/// Run a single-input session and return its first output as an owned array
pub fn run_single(
    session: &Mutex<Session>,
    input_name: &str,
    input: Array4<f32>,
) -> Result<ArrayD<f32>> {
    let input_value = Value::from_array(input).context("Failed to create input tensor")?;

    let mut session = session
        .lock()
        .map_err(|_| anyhow!("ONNX session lock poisoned"))?;

    let outputs = session
        .run(ort::inputs![input_name => input_value])
        .context("Detection inference failed")?;

    let output = outputs[0]
        .try_extract_array::<f32>()
        .context("Failed to extract output tensor")?;

    debug!("Detection output shape: {:?}", output.shape());

    Ok(output.to_owned())
}
