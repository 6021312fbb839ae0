// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod analysis;
pub mod detect;
pub mod errors;
pub mod handlers;
pub mod http_server;
pub mod page;
pub mod server;

pub use analysis::{latest_analysis_handler, update_analysis_handler, AnalysisMailbox};
pub use detect::{detect_handler, DetectRequest, DetectResponse};
pub use errors::{ApiError, ErrorResponse};
pub use handlers::{health_handler, HealthResponse, ModelStatus};
pub use http_server::{create_app, AppState, MAX_REQUEST_BODY};
pub use page::index_handler;
pub use server::ApiServer;
