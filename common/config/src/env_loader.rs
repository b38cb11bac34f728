//! Environment variable overrides.

use std::collections::HashMap;

use toolrun_protocol::ToolCallConfig;
use tracing::debug;
use tracing::warn;

use crate::RuntimeConfig;

// Default tool limits
pub const ENV_MAX_DURATION_MS: &str = "TOOLRUN_MAX_DURATION_MS";
pub const ENV_MAX_BACKGROUND_DURATION_MS: &str = "TOOLRUN_MAX_BACKGROUND_DURATION_MS";
pub const ENV_ALLOW_BACKGROUND: &str = "TOOLRUN_ALLOW_BACKGROUND";
pub const ENV_MAX_OUTPUT_TOKENS: &str = "TOOLRUN_MAX_OUTPUT_TOKENS";

// Retention
pub const ENV_TASK_RETENTION_MS: &str = "TOOLRUN_TASK_RETENTION_MS";
pub const ENV_OUTPUT_RETENTION_MS: &str = "TOOLRUN_OUTPUT_RETENTION_MS";

// Terminal
pub const ENV_TERMINAL_SHELL: &str = "TOOLRUN_TERMINAL_SHELL";
pub const ENV_TERMINAL_IDLE_TTL_MS: &str = "TOOLRUN_TERMINAL_IDLE_TTL_MS";
pub const ENV_TERMINAL_MAX_BUFFER_ENTRIES: &str = "TOOLRUN_TERMINAL_MAX_BUFFER_ENTRIES";

// Logging
pub const ENV_LOG_LEVEL: &str = "TOOLRUN_LOG_LEVEL";

/// Reads `TOOLRUN_*` overrides.
///
/// Unparseable values are logged and ignored.
#[derive(Debug, Default)]
pub struct EnvLoader {
    vars: Option<HashMap<String, String>>,
}

impl EnvLoader {
    /// Loader reading the process environment.
    pub fn new() -> Self {
        Self { vars: None }
    }

    /// Loader reading a fixed set of variables instead of the process
    /// environment.
    pub fn from_vars(vars: HashMap<String, String>) -> Self {
        Self { vars: Some(vars) }
    }

    /// Apply every override that is set.
    pub fn apply(&self, config: &mut RuntimeConfig) {
        self.apply_tool(&mut config.default_tool);

        if let Some(val) = self.get_i64(ENV_TASK_RETENTION_MS) {
            config.tasks.retention_ms = val;
            debug!(env = ENV_TASK_RETENTION_MS, value = val, "loaded");
        }
        if let Some(val) = self.get_i64(ENV_OUTPUT_RETENTION_MS) {
            config.outputs.retention_ms = val;
            debug!(env = ENV_OUTPUT_RETENTION_MS, value = val, "loaded");
        }

        if let Some(val) = self.get_string(ENV_TERMINAL_SHELL) {
            debug!(env = ENV_TERMINAL_SHELL, value = %val, "loaded");
            config.terminal.shell = Some(val);
        }
        if let Some(val) = self.get_i64(ENV_TERMINAL_IDLE_TTL_MS) {
            config.terminal.idle_ttl_ms = val;
            debug!(env = ENV_TERMINAL_IDLE_TTL_MS, value = val, "loaded");
        }
        if let Some(val) = self.get_i32(ENV_TERMINAL_MAX_BUFFER_ENTRIES) {
            config.terminal.max_buffer_entries = val;
            debug!(env = ENV_TERMINAL_MAX_BUFFER_ENTRIES, value = val, "loaded");
        }

        if let Some(val) = self.get_string(ENV_LOG_LEVEL) {
            debug!(env = ENV_LOG_LEVEL, value = %val, "loaded");
            config.logging.level = val;
        }
    }

    fn apply_tool(&self, tool: &mut ToolCallConfig) {
        if let Some(val) = self.get_i64(ENV_MAX_DURATION_MS) {
            tool.max_duration_ms = val;
            debug!(env = ENV_MAX_DURATION_MS, value = val, "loaded");
        }
        if let Some(val) = self.get_i64(ENV_MAX_BACKGROUND_DURATION_MS) {
            tool.max_background_duration_ms = val;
            debug!(env = ENV_MAX_BACKGROUND_DURATION_MS, value = val, "loaded");
        }
        if let Some(val) = self.get_bool(ENV_ALLOW_BACKGROUND) {
            tool.allow_background = val;
            debug!(env = ENV_ALLOW_BACKGROUND, value = val, "loaded");
        }
        if let Some(val) = self.get_i32(ENV_MAX_OUTPUT_TOKENS) {
            // Zero or below disables truncation.
            tool.max_output_tokens = (val > 0).then_some(val);
            debug!(env = ENV_MAX_OUTPUT_TOKENS, value = val, "loaded");
        }
    }

    fn get_string(&self, key: &str) -> Option<String> {
        let value = match &self.vars {
            Some(vars) => vars.get(key).cloned(),
            None => std::env::var(key).ok(),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    fn get_i64(&self, key: &str) -> Option<i64> {
        self.get_string(key).and_then(|s| match s.trim().parse::<i64>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(key, value = %s, "Failed to parse i64 from env var");
                None
            }
        })
    }

    fn get_i32(&self, key: &str) -> Option<i32> {
        self.get_string(key).and_then(|s| match s.trim().parse::<i32>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(key, value = %s, "Failed to parse i32 from env var");
                None
            }
        })
    }

    fn get_bool(&self, key: &str) -> Option<bool> {
        self.get_string(key)
            .and_then(|s| match s.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => Some(true),
                "0" | "false" | "no" => Some(false),
                _ => {
                    warn!(key, value = %s, "Unrecognized boolean value, ignoring");
                    None
                }
            })
    }
}

#[cfg(test)]
#[path = "env_loader.test.rs"]
mod tests;
