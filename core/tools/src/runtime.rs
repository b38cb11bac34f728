//! One runtime per chat or agent session.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use toolrun_config::RuntimeConfig;
use toolrun_protocol::ToolOutput;
use toolrun_tasks::DetachedSpawner;
use toolrun_tasks::TaskStore;
use toolrun_tasks::TokioSpawner;
use toolrun_terminal::SessionMultiplexer;
use toolrun_terminal::TerminalBackend;
use tracing::debug;
use tracing::info;

use crate::OutputStore;
use crate::Tool;
use crate::ToolDefinition;
use crate::ToolRegistry;
use crate::WrappedTool;
use crate::builtin;
use crate::context::ToolContext;
use crate::error::Result;

/// Owns the task store, output store, terminal sessions and tool registry.
///
/// Executing tools (`shell`, `terminal_exec` and anything added through
/// [`ToolRuntime::register`]) run behind a [`WrappedTool`] configured from
/// [`RuntimeConfig::tool_config`]. The inspection tools are registered
/// as-is. Expired tasks and outputs are swept before every call.
pub struct ToolRuntime {
    config: RuntimeConfig,
    tasks: TaskStore,
    outputs: OutputStore,
    terminals: Arc<SessionMultiplexer>,
    registry: ToolRegistry,
}

impl ToolRuntime {
    pub fn new(config: RuntimeConfig, backend: Arc<dyn TerminalBackend>) -> Self {
        Self::with_spawner(config, backend, Arc::new(TokioSpawner))
    }

    /// Like [`ToolRuntime::new`], running background tasks through `spawner`.
    pub fn with_spawner(
        config: RuntimeConfig,
        backend: Arc<dyn TerminalBackend>,
        spawner: Arc<dyn DetachedSpawner>,
    ) -> Self {
        let tasks = TaskStore::with_spawner(spawner);
        let outputs = OutputStore::new();
        let terminals = Arc::new(SessionMultiplexer::new(backend, config.terminal.clone()));
        let mut runtime = Self {
            config,
            tasks,
            outputs,
            terminals,
            registry: ToolRegistry::new(),
        };
        runtime.register_builtins();
        runtime
    }

    fn register_builtins(&mut self) {
        let tasks = self.tasks.clone();
        let terminals = Arc::clone(&self.terminals);
        let read_limit = self.config.outputs.default_read_limit.max(1) as usize;

        self.registry.register(builtin::GetTaskTool::new(
            tasks.clone(),
            self.config.tasks.clone(),
        ));
        self.registry.register(builtin::CancelTaskTool::new(tasks.clone()));
        self.registry.register(builtin::ListTasksTool::new(tasks));
        self.registry.register(builtin::ReadOutputTool::new(
            self.outputs.clone(),
            read_limit,
        ));
        self.registry
            .register(builtin::TerminalOpenTool::new(Arc::clone(&terminals)));
        self.registry
            .register(builtin::TerminalReadTool::new(Arc::clone(&terminals)));
        self.registry
            .register(builtin::TerminalWriteTool::new(Arc::clone(&terminals)));
        self.registry
            .register(builtin::TerminalResizeTool::new(Arc::clone(&terminals)));
        self.registry
            .register(builtin::TerminalListTool::new(Arc::clone(&terminals)));
        self.registry
            .register(builtin::TerminalCloseTool::new(Arc::clone(&terminals)));

        self.register(Arc::new(builtin::TerminalExecTool::new(terminals)));
        self.register(Arc::new(builtin::ShellCommandTool::new(
            self.config.terminal.resolved_shell(),
        )));
    }

    /// Register `tool` behind a [`WrappedTool`] using its configured limits.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let config = self.config.tool_config(tool.name());
        let wrapped = WrappedTool::new(tool, config, self.tasks.clone(), self.outputs.clone());
        self.registry.register(wrapped);
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn tasks(&self) -> &TaskStore {
        &self.tasks
    }

    pub fn outputs(&self) -> &OutputStore {
        &self.outputs
    }

    pub fn terminals(&self) -> &Arc<SessionMultiplexer> {
        &self.terminals
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.registry.definitions()
    }

    /// Sweep retention, then run tool `name`.
    pub async fn execute(
        &self,
        name: &str,
        input: Value,
        ctx: &mut ToolContext,
    ) -> Result<ToolOutput> {
        self.sweep().await;
        debug!(tool = name, call_id = %ctx.call_id, "Executing tool");
        self.registry.execute(name, input, ctx).await
    }

    /// Remove tasks and outputs past their retention window.
    ///
    /// Returns `(tasks_removed, outputs_removed)`.
    pub async fn sweep(&self) -> (usize, usize) {
        let tasks = self
            .tasks
            .cleanup(retention(self.config.tasks.retention_ms))
            .await;
        let outputs = self
            .outputs
            .cleanup(retention(self.config.outputs.retention_ms))
            .await;
        (tasks, outputs)
    }

    /// Cancel unfinished tasks and close every terminal session.
    pub async fn shutdown(&self) {
        let mut cancelled = 0;
        for task in self.tasks.list(None).await {
            if task.status.is_terminal() {
                continue;
            }
            if let Ok(outcome) = self.tasks.cancel(&task.id).await {
                cancelled += usize::from(outcome.cancelled);
            }
        }
        self.terminals.shutdown().await;
        info!(cancelled, "Tool runtime shut down");
    }
}

impl std::fmt::Debug for ToolRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRuntime")
            .field("registry", &self.registry)
            .field("tasks", &self.tasks)
            .finish_non_exhaustive()
    }
}

fn retention(ms: i64) -> Duration {
    Duration::from_millis(ms.max(0) as u64)
}

#[cfg(test)]
#[path = "runtime.test.rs"]
mod tests;
