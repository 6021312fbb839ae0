// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use ammonia::clean_text;
use axum::extract::{Query, State};
use axum::response::Html;

use crate::api::http_server::AppState;
use crate::config::DEFAULT_ESP32_HOST;

const INDEX_TEMPLATE: &str = include_str!("../../../templates/index.html");

const HOST_PLACEHOLDER: &str = "{{ESP32_HOST}}";

const HOST_PARAM: &str = "esp32url";

/// First `esp32url` value in the query string, if any
pub fn query_host(params: &[(String, String)]) -> Option<&str> {
    params
        .iter()
        .find(|(key, _)| key == HOST_PARAM)
        .map(|(_, value)| value.as_str())
}

/// Pick the device address: query parameter, then configured host, then the
/// built-in fallback. Empty values count as unset.
pub fn resolve_host(query: Option<&str>, configured: &str) -> String {
    [query.unwrap_or_default(), configured]
        .into_iter()
        .map(str::trim)
        .find(|host| !host.is_empty())
        .unwrap_or(DEFAULT_ESP32_HOST)
        .to_string()
}

/// Fill the page template with an HTML-escaped device address
pub fn render_index(host: &str) -> String {
    INDEX_TEMPLATE.replace(HOST_PLACEHOLDER, &clean_text(host))
}

/// GET / - Render the index page
///
/// A repeated `esp32url` uses its first value; a query string that cannot be
/// parsed is ignored.
pub async fn index_handler(
    State(state): State<AppState>,
    query: Option<Query<Vec<(String, String)>>>,
) -> Html<String> {
    let params = query.map(|Query(params)| params).unwrap_or_default();
    let host = resolve_host(query_host(&params), &state.config.esp32_host);
    Html(render_index(&host))
}
