//! Full copies of tool results too large to return inline.
//!
//! Offsets and lengths are counted in characters, not bytes, so a page
//! boundary never splits a code point.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use chrono::TimeDelta;
use chrono::Utc;
use serde::Serialize;
use snafu::OptionExt;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;
use crate::error::tool_error::OutputNotFoundSnafu;

/// Where a stored output came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputMeta {
    pub tool_name: String,
    pub call_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredOutput {
    pub id: String,
    pub content: String,
    pub tool_name: String,
    pub call_id: String,
    pub created_at: DateTime<Utc>,
    /// Length of `content` in characters.
    pub total_length: usize,
}

/// One page of a stored output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputPage {
    pub content: String,
    pub offset: usize,
    pub total_length: usize,
    pub has_more: bool,
}

#[derive(Clone, Default)]
pub struct OutputStore {
    outputs: Arc<Mutex<HashMap<String, StoredOutput>>>,
}

impl OutputStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `content` and return its id.
    pub async fn store(&self, content: String, meta: OutputMeta) -> String {
        let id = format!("output-{}", Uuid::new_v4().simple());
        let total_length = content.chars().count();
        debug!(output_id = %id, tool = %meta.tool_name, total_length, "Stored output");
        let output = StoredOutput {
            id: id.clone(),
            content,
            tool_name: meta.tool_name,
            call_id: meta.call_id,
            created_at: Utc::now(),
            total_length,
        };
        self.outputs.lock().await.insert(id.clone(), output);
        id
    }

    pub async fn get(&self, output_id: &str) -> Option<StoredOutput> {
        self.outputs.lock().await.get(output_id).cloned()
    }

    /// Every stored output, oldest first.
    pub async fn get_all(&self) -> Vec<StoredOutput> {
        let mut all: Vec<StoredOutput> = self.outputs.lock().await.values().cloned().collect();
        all.sort_by_key(|o| o.created_at);
        all
    }

    /// Read up to `limit` characters starting at `offset`.
    ///
    /// Offsets past the end yield an empty page with `has_more: false`.
    pub async fn read(&self, output_id: &str, offset: usize, limit: usize) -> Result<OutputPage> {
        let outputs = self.outputs.lock().await;
        let output = outputs.get(output_id).context(OutputNotFoundSnafu { output_id })?;

        let start = offset.min(output.total_length);
        let content: String = output.content.chars().skip(start).take(limit).collect();
        let end = start + content.chars().count();
        Ok(OutputPage {
            content,
            offset: start,
            total_length: output.total_length,
            has_more: end < output.total_length,
        })
    }

    /// Remove outputs at least `max_age` old. Returns how many were removed.
    pub async fn cleanup(&self, max_age: Duration) -> usize {
        let max_age = TimeDelta::from_std(max_age).unwrap_or(TimeDelta::MAX);
        let now = Utc::now();
        let mut outputs = self.outputs.lock().await;
        let before = outputs.len();
        outputs.retain(|_, o| now - o.created_at < max_age);
        let removed = before - outputs.len();
        if removed > 0 {
            debug!(removed, "Cleaned up stored outputs");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.outputs.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.outputs.lock().await.is_empty()
    }
}

impl std::fmt::Debug for OutputStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "output_store.test.rs"]
mod tests;
