// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::analysis::{latest_analysis_handler, update_analysis_handler, AnalysisMailbox};
use super::detect::detect_handler;
use super::handlers::health_handler;
use super::page::index_handler;
use crate::config::NodeConfig;
use crate::vision::image_utils::MAX_IMAGE_SIZE;
use crate::vision::{DetectionModelManager, DetectionThresholds, ProviderLoader};

/// Largest accepted request body: a base64-encoded image of
/// `MAX_IMAGE_SIZE` bytes plus room for the JSON envelope
pub const MAX_REQUEST_BODY: usize = MAX_IMAGE_SIZE.div_ceil(3) * 4 + 64 * 1024;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub model_manager: Arc<DetectionModelManager>,
    pub mailbox: Arc<AnalysisMailbox>,
    pub config: Arc<NodeConfig>,
    pub thresholds: DetectionThresholds,
}

impl AppState {
    /// State with the production provider chain built from `config`
    pub fn new(config: NodeConfig) -> Self {
        let manager = DetectionModelManager::new(config.model_config());
        Self::with_model_manager(config, manager)
    }

    pub fn with_model_manager(config: NodeConfig, model_manager: DetectionModelManager) -> Self {
        Self {
            thresholds: config.thresholds(),
            model_manager: Arc::new(model_manager),
            mailbox: Arc::new(AnalysisMailbox::new()),
            config: Arc::new(config),
        }
    }

    /// Default config and the given provider loaders
    pub fn new_for_test(loaders: Vec<Arc<dyn ProviderLoader>>) -> Self {
        Self::with_model_manager(
            NodeConfig::default(),
            DetectionModelManager::with_loaders(loaders),
        )
    }
}

/// Build the router with every route, the body limit, CORS and request tracing
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/detect", post(detect_handler))
        .route("/update_analysis", post(update_analysis_handler))
        .route("/latest_analysis", get(latest_analysis_handler))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
