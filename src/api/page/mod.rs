// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Index page
//!
//! GET / - HTML page that shows the ESP32 stream and polls the mailbox

pub mod handler;

pub use handler::{index_handler, render_index, query_host, resolve_host};
