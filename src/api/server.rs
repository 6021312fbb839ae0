// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::http_server::{create_app, AppState};

/// HTTP server bound to a socket, serving in the background once started
pub struct ApiServer {
    addr: SocketAddr,
    state: AppState,
    listener: Option<TcpListener>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    server_task: Option<JoinHandle<()>>,
}

impl ApiServer {
    /// Bind `addr` without serving yet. Port 0 picks a free port.
    pub async fn bind(addr: SocketAddr, state: AppState) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        let addr = listener.local_addr()?;

        Ok(Self {
            addr,
            state,
            listener: Some(listener),
            shutdown_tx: None,
            server_task: None,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start serving on a background task
    pub fn start(&mut self) {
        if let Some(listener) = self.listener.take() {
            let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
            self.shutdown_tx = Some(shutdown_tx);

            let app = create_app(self.state.clone());
            let addr = self.addr;

            self.server_task = Some(tokio::spawn(async move {
                let serve_future = axum::serve(listener, app).with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                });

                if let Err(e) = serve_future.await {
                    error!("HTTP server on {} stopped with error: {}", addr, e);
                }
            }));

            info!("HTTP server listening on {}", self.addr);
        }
    }

    /// Stop accepting connections and wait for in-flight requests
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.server_task.take() {
            let _ = task.await;
        }
        info!("HTTP server on {} shut down", self.addr);
    }
}
