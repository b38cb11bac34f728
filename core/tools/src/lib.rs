//! Tool execution runtime.
//!
//! Wraps tools with timeout control, cooperative cancellation, promotion to
//! background execution and output truncation, and exposes the inspection
//! tools (`get_task`, `read_output`, `terminal_*`, ...) that let a caller
//! follow up on work that outlived its call.

pub mod builtin;
mod context;
pub mod error;
mod fn_tool;
mod output_store;
mod registry;
mod runtime;
mod schema;
mod tool;
mod truncation;
mod wrapper;

pub use context::ToolContext;
pub use error::Result;
pub use error::ToolError;
pub use fn_tool::FnTool;
pub use output_store::OutputMeta;
pub use output_store::OutputPage;
pub use output_store::OutputStore;
pub use output_store::StoredOutput;
pub use registry::ToolRegistry;
pub use runtime::ToolRuntime;
pub use schema::ExecutionOptions;
pub use schema::augment_schema;
pub use tool::Tool;
pub use tool::ToolDefinition;
pub use truncation::truncate_if_needed;
pub use wrapper::WrappedTool;

pub use toolrun_protocol::ToolOutput;
pub use toolrun_protocol::ToolResultContent;
