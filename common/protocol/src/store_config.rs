//! Settings for the task store, the output store and terminal sessions.

use serde::Deserialize;
use serde::Serialize;

/// Default retention for finished tasks and stored outputs (1 hour).
pub const DEFAULT_RETENTION_MS: i64 = 3_600_000;

/// Default poll interval for `get_task` waits.
pub const DEFAULT_POLL_INTERVAL_MS: i64 = 500;

/// Default upper bound for `get_task` waits (5 minutes).
pub const DEFAULT_WAIT_TIMEOUT_MS: i64 = 300_000;

/// Default page size for `read_output`, in characters.
pub const DEFAULT_READ_LIMIT: i64 = 30_000;

/// Default idle time after which a terminal session is evicted (10 minutes).
pub const DEFAULT_IDLE_TTL_MS: i64 = 600_000;

/// Default number of output chunks retained per terminal session.
pub const DEFAULT_MAX_BUFFER_ENTRIES: i32 = 1_000;

/// Default deadline for a single `terminal_exec` command.
pub const DEFAULT_COMMAND_TIMEOUT_MS: i64 = 120_000;

/// Background task store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStoreConfig {
    /// How long a finished task is kept, in milliseconds.
    #[serde(default = "default_retention_ms")]
    pub retention_ms: i64,
    #[serde(default = "default_poll_interval_ms")]
    pub default_poll_interval_ms: i64,
    #[serde(default = "default_wait_timeout_ms")]
    pub default_wait_timeout_ms: i64,
}

impl Default for TaskStoreConfig {
    fn default() -> Self {
        Self {
            retention_ms: DEFAULT_RETENTION_MS,
            default_poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            default_wait_timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
        }
    }
}

/// Truncated output store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputStoreConfig {
    /// How long a stored output is kept, in milliseconds.
    #[serde(default = "default_retention_ms")]
    pub retention_ms: i64,
    /// Page size when `read_output` is called without a limit.
    #[serde(default = "default_read_limit")]
    pub default_read_limit: i64,
}

impl Default for OutputStoreConfig {
    fn default() -> Self {
        Self {
            retention_ms: DEFAULT_RETENTION_MS,
            default_read_limit: DEFAULT_READ_LIMIT,
        }
    }
}

/// Terminal session settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalConfig {
    /// Shell program. Falls back to `$SHELL`, then `/bin/sh`.
    #[serde(default)]
    pub shell: Option<String>,
    #[serde(default = "default_idle_ttl_ms")]
    pub idle_ttl_ms: i64,
    /// Output chunks kept per session; older chunks are dropped first.
    #[serde(default = "default_max_buffer_entries")]
    pub max_buffer_entries: i32,
    #[serde(default = "default_cols")]
    pub default_cols: i32,
    #[serde(default = "default_rows")]
    pub default_rows: i32,
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: i64,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            shell: None,
            idle_ttl_ms: DEFAULT_IDLE_TTL_MS,
            max_buffer_entries: DEFAULT_MAX_BUFFER_ENTRIES,
            default_cols: default_cols(),
            default_rows: default_rows(),
            command_timeout_ms: DEFAULT_COMMAND_TIMEOUT_MS,
        }
    }
}

impl TerminalConfig {
    /// Resolve the shell program to launch.
    pub fn resolved_shell(&self) -> String {
        self.shell
            .clone()
            .or_else(|| std::env::var("SHELL").ok().filter(|s| !s.is_empty()))
            .unwrap_or_else(|| "/bin/sh".to_string())
    }

    /// Buffer capacity, at least one chunk.
    pub fn buffer_capacity(&self) -> usize {
        self.max_buffer_entries.max(1) as usize
    }
}

fn default_retention_ms() -> i64 {
    DEFAULT_RETENTION_MS
}

fn default_poll_interval_ms() -> i64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_wait_timeout_ms() -> i64 {
    DEFAULT_WAIT_TIMEOUT_MS
}

fn default_read_limit() -> i64 {
    DEFAULT_READ_LIMIT
}

fn default_idle_ttl_ms() -> i64 {
    DEFAULT_IDLE_TTL_MS
}

fn default_max_buffer_entries() -> i32 {
    DEFAULT_MAX_BUFFER_ENTRIES
}

fn default_cols() -> i32 {
    120
}

fn default_rows() -> i32 {
    40
}

fn default_command_timeout_ms() -> i64 {
    DEFAULT_COMMAND_TIMEOUT_MS
}

#[cfg(test)]
#[path = "store_config.test.rs"]
mod tests;
