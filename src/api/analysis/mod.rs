// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Latest-analysis mailbox endpoints
//!
//! POST /update_analysis - Replace the stored analysis
//! GET /latest_analysis - Read it back

pub mod handler;
pub mod mailbox;

pub use handler::{latest_analysis_handler, update_analysis_handler, UpdateAnalysisResponse};
pub use mailbox::AnalysisMailbox;
