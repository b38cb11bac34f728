use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;
use toolrun_protocol::OutputStoreConfig;
use toolrun_protocol::TaskStoreConfig;
use toolrun_protocol::TerminalConfig;
use toolrun_protocol::ToolCallConfig;
use toolrun_utils_common::LoggingConfig;

use crate::error::ConfigError;
use crate::error::Result;

/// Complete runtime configuration.
///
/// # Example
///
/// ```json
/// {
///   "default_tool": { "max_duration_ms": 60000 },
///   "tools": {
///     "shell": { "allow_background": true, "max_output_tokens": 8000 }
///   },
///   "terminal": { "shell": "/bin/bash", "idle_ttl_ms": 300000 },
///   "logging": { "level": "debug" }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Limits for tools without an entry in `tools`.
    #[serde(default)]
    pub default_tool: ToolCallConfig,
    /// Per-tool limits keyed by tool name.
    #[serde(default)]
    pub tools: HashMap<String, ToolCallConfig>,
    #[serde(default)]
    pub tasks: TaskStoreConfig,
    #[serde(default)]
    pub outputs: OutputStoreConfig,
    #[serde(default)]
    pub terminal: TerminalConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RuntimeConfig {
    /// Limits for `tool_name`, falling back to `default_tool`.
    pub fn tool_config(&self, tool_name: &str) -> ToolCallConfig {
        self.tools
            .get(tool_name)
            .cloned()
            .unwrap_or_else(|| self.default_tool.clone())
    }

    /// Reject values that cannot describe a working runtime.
    pub fn validate(&self) -> Result<()> {
        check_tool("default_tool", &self.default_tool)?;
        for (name, tool) in &self.tools {
            check_tool(&format!("tools.{name}"), tool)?;
        }
        non_negative("tasks.retention_ms", self.tasks.retention_ms)?;
        non_negative("outputs.retention_ms", self.outputs.retention_ms)?;
        positive("outputs.default_read_limit", self.outputs.default_read_limit)?;
        non_negative("terminal.idle_ttl_ms", self.terminal.idle_ttl_ms)?;
        positive(
            "terminal.max_buffer_entries",
            i64::from(self.terminal.max_buffer_entries),
        )?;
        positive("terminal.command_timeout_ms", self.terminal.command_timeout_ms)?;
        Ok(())
    }
}

fn check_tool(prefix: &str, tool: &ToolCallConfig) -> Result<()> {
    non_negative(&format!("{prefix}.max_duration_ms"), tool.max_duration_ms)?;
    non_negative(
        &format!("{prefix}.max_background_duration_ms"),
        tool.max_background_duration_ms,
    )?;
    if let Some(tokens) = tool.max_output_tokens {
        positive(&format!("{prefix}.max_output_tokens"), i64::from(tokens))?;
    }
    Ok(())
}

fn non_negative(field: &str, value: i64) -> Result<()> {
    if value < 0 {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            message: format!("must be >= 0, got {value}"),
        });
    }
    Ok(())
}

fn positive(field: &str, value: i64) -> Result<()> {
    if value <= 0 {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            message: format!("must be > 0, got {value}"),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "runtime_config.test.rs"]
mod tests;
