// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use esp32_vision_node::{
    api::{ApiServer, AppState},
    config::NodeConfig,
    version,
};
use std::env;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    println!("🚀 Starting ESP32 Vision Node...\n");
    println!("📦 BUILD VERSION: {}", version::VERSION);
    println!("📅 Build Date: {}", version::BUILD_DATE);
    println!();

    let config = NodeConfig::parse();
    config.validate()?;
    let addr = config.listen_addr()?;

    tracing::info!(
        model_dir = %config.model_dir.display(),
        min_confidence = config.min_confidence,
        iou = config.iou_threshold,
        esp32_host = %config.esp32_host,
        "Configuration loaded"
    );
    println!("👁️  Detection model loads on the first /detect request");

    let state = AppState::new(config);
    let mut server = ApiServer::bind(addr, state).await?;
    server.start();

    println!("✅ Listening on http://{}", server.local_addr());
    println!("\nPress Ctrl+C to shutdown...");

    signal::ctrl_c().await?;

    println!("\n🛑 Shutting down...");
    server.shutdown().await;

    Ok(())
}
