// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;

/// Single shared analysis value; the last writer wins
#[derive(Debug)]
pub struct AnalysisMailbox {
    inner: RwLock<MailboxState>,
}

#[derive(Debug)]
struct MailboxState {
    value: Value,
    updated_at: Option<DateTime<Utc>>,
}

impl AnalysisMailbox {
    /// Empty mailbox holding `{}`
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MailboxState {
                value: Value::Object(serde_json::Map::new()),
                updated_at: None,
            }),
        }
    }

    /// Replace the stored value wholesale
    pub async fn replace(&self, value: Value) {
        let mut state = self.inner.write().await;
        state.value = value;
        state.updated_at = Some(Utc::now());
    }

    pub async fn latest(&self) -> Value {
        self.inner.read().await.value.clone()
    }

    /// Time of the last write, `None` before the first
    pub async fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.inner.read().await.updated_at
    }
}

impl Default for AnalysisMailbox {
    fn default() -> Self {
        Self::new()
    }
}
