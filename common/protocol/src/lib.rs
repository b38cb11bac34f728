//! Protocol types for the toolrun runtime.
//!
//! This crate provides the foundational types shared across the workspace:
//! - Per-tool execution limits ([`ToolCallConfig`])
//! - Tool results ([`ToolOutput`])
//! - Background task status ([`TaskStatus`])
//! - Store and terminal settings

pub mod store_config;
pub mod task_types;
pub mod tool_config;
pub mod tool_types;

pub use store_config::OutputStoreConfig;
pub use store_config::TaskStoreConfig;
pub use store_config::TerminalConfig;
pub use task_types::TaskStatus;
pub use tool_config::CHARS_PER_TOKEN;
pub use tool_config::ToolCallConfig;
pub use tool_types::ToolOutput;
pub use tool_types::ToolResultContent;
