//! Per-tool execution limits.
//!
//! Defines how long a tool may run, whether the caller may shorten that
//! deadline, whether the call may move to the background, and how much
//! output is returned inline.

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

/// Default cap on a foreground execution (2 minutes).
pub const DEFAULT_MAX_DURATION_MS: i64 = 120_000;

/// Default cap on an execution once it runs in the background (30 minutes).
pub const DEFAULT_MAX_BACKGROUND_DURATION_MS: i64 = 1_800_000;

/// Default inline output budget in tokens.
pub const DEFAULT_MAX_OUTPUT_TOKENS: i32 = 10_000;

/// Fixed characters-per-token ratio used to turn a token budget into a
/// character budget.
///
/// Deliberately low so the character budget under-estimates what a real
/// tokenizer would allow.
pub const CHARS_PER_TOKEN: usize = 3;

/// Execution limits for a single tool.
///
/// # Example
///
/// ```json
/// {
///   "max_duration_ms": 30000,
///   "allow_background": true,
///   "max_output_tokens": 4000
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ToolCallConfig {
    /// Cap on any execution, in milliseconds.
    #[serde(default = "default_max_duration_ms")]
    pub max_duration_ms: i64,

    /// Cap on an execution once it runs in the background, in milliseconds.
    #[serde(default = "default_max_background_duration_ms")]
    pub max_background_duration_ms: i64,

    /// Whether the caller may request a shorter timeout.
    #[serde(default = "default_true")]
    pub allow_agent_set_duration: bool,

    /// Whether the caller may request background execution, and whether a
    /// foreground timeout promotes the call to the background.
    #[serde(default)]
    pub allow_background: bool,

    /// Inline output budget in tokens. `None` disables truncation.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: Option<i32>,
}

impl Default for ToolCallConfig {
    fn default() -> Self {
        Self {
            max_duration_ms: DEFAULT_MAX_DURATION_MS,
            max_background_duration_ms: DEFAULT_MAX_BACKGROUND_DURATION_MS,
            allow_agent_set_duration: true,
            allow_background: false,
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

impl ToolCallConfig {
    /// Resolve the deadline for a foreground execution.
    ///
    /// `min(requested ?? max_duration, max_duration)`, never negative. The
    /// request is ignored unless `allow_agent_set_duration` is set.
    pub fn effective_timeout(&self, requested_ms: Option<i64>) -> Duration {
        let max = self.max_duration_ms.max(0);
        let requested = requested_ms.filter(|_| self.allow_agent_set_duration);
        let ms = requested.unwrap_or(max).clamp(0, max);
        Duration::from_millis(ms as u64)
    }

    /// Deadline for an execution running in the background.
    pub fn background_timeout(&self) -> Duration {
        Duration::from_millis(self.max_background_duration_ms.max(0) as u64)
    }

    /// Inline output budget in characters, if truncation is enabled.
    pub fn output_budget_chars(&self) -> Option<usize> {
        self.max_output_tokens
            .map(|tokens| tokens.max(0) as usize * CHARS_PER_TOKEN)
    }
}

fn default_max_duration_ms() -> i64 {
    DEFAULT_MAX_DURATION_MS
}

fn default_max_background_duration_ms() -> i64 {
    DEFAULT_MAX_BACKGROUND_DURATION_MS
}

fn default_max_output_tokens() -> Option<i32> {
    Some(DEFAULT_MAX_OUTPUT_TOKENS)
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
#[path = "tool_config.test.rs"]
mod tests;
