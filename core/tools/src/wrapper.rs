//! Timeout, cancellation and background promotion around any [`Tool`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;
use serde_json::json;
use toolrun_async_utils::LinkedCancellation;
use toolrun_async_utils::RaceErr;
use toolrun_async_utils::run_with_deadline;
use toolrun_protocol::ToolCallConfig;
use toolrun_protocol::ToolOutput;
use toolrun_tasks::TaskStore;
use tracing::debug;
use tracing::info;

use crate::ExecutionOptions;
use crate::OutputStore;
use crate::Tool;
use crate::augment_schema;
use crate::context::ToolContext;
use crate::error::Result;
use crate::error::tool_error;
use crate::truncate_if_needed;

/// A [`Tool`] running under a [`ToolCallConfig`].
///
/// Callers may add `timeout` (ms) and `background` to the input. The
/// foreground path races the inner execution against the effective timeout
/// and the caller's cancellation; on timeout the same in-flight execution
/// moves to the [`TaskStore`] when the config allows it, and the call
/// returns a task handle instead of an error.
pub struct WrappedTool {
    inner: Arc<dyn Tool>,
    config: ToolCallConfig,
    tasks: TaskStore,
    truncation: Truncation,
    schema: Value,
}

impl WrappedTool {
    pub fn new(
        inner: Arc<dyn Tool>,
        config: ToolCallConfig,
        tasks: TaskStore,
        outputs: OutputStore,
    ) -> Self {
        let schema = augment_schema(&inner.input_schema(), &config);
        let truncation = Truncation {
            store: outputs,
            budget_chars: config.output_budget_chars(),
            tool_name: inner.name().to_string(),
        };
        Self {
            inner,
            config,
            tasks,
            truncation,
            schema,
        }
    }

    pub fn config(&self) -> &ToolCallConfig {
        &self.config
    }

    pub fn inner(&self) -> &Arc<dyn Tool> {
        &self.inner
    }

    /// Start `args` as a background task and return its handle.
    async fn start_background(&self, args: Value, ctx: &ToolContext) -> Result<ToolOutput> {
        let task = self
            .tasks
            .create(self.name(), args.clone(), ctx.call_id.clone())
            .await;

        let inner = self.inner.clone();
        let base_ctx = ctx.clone();
        let finish = self.truncation.finisher(&ctx.call_id);
        self.tasks
            .run_in_background_with(
                &task.id,
                move |token| {
                    let mut exec_ctx = base_ctx.scoped(token);
                    async move { inner.execute(args, &mut exec_ctx).await }
                },
                self.config.background_timeout(),
                finish,
            )
            .await?;

        info!(tool = self.name(), task_id = %task.id, "Started background execution");
        Ok(task_handle(
            &task.id,
            format!(
                "Running in the background as {}. Use get_task to check its status.",
                task.id
            ),
        ))
    }

    async fn run_foreground(
        &self,
        args: Value,
        timeout: Duration,
        ctx: &ToolContext,
    ) -> Result<ToolOutput> {
        let mut linked = LinkedCancellation::new();
        linked.link(&ctx.cancel_token);
        if let Some(request) = &ctx.request_token {
            linked.link(request);
        }
        let token = linked.token();

        let inner = self.inner.clone();
        let mut exec_ctx = ctx.scoped(token.clone());
        let exec_args = args.clone();
        let mut execution: BoxFuture<'static, Result<ToolOutput>> =
            Box::pin(async move { inner.execute(exec_args, &mut exec_ctx).await });

        let settled = run_with_deadline(&mut execution, &token, timeout).await;
        match settled {
            Ok(Ok(output)) => Ok(self.truncation.apply(output, &ctx.call_id).await),
            Ok(Err(err)) => Err(err),
            Err(RaceErr::Cancelled) => {
                debug!(tool = self.name(), call_id = %ctx.call_id, "Foreground execution cancelled");
                tool_error::CancelledSnafu.fail()
            }
            Err(RaceErr::TimedOut) => self.promote(execution, linked, args, timeout, ctx).await,
        }
    }

    /// Hand an execution that outlived its deadline to the task store.
    async fn promote(
        &self,
        execution: BoxFuture<'static, Result<ToolOutput>>,
        mut linked: LinkedCancellation,
        args: Value,
        timeout: Duration,
        ctx: &ToolContext,
    ) -> Result<ToolOutput> {
        let timeout_ms = timeout.as_millis() as i64;
        if !self.config.allow_background {
            linked.cancel();
            return tool_error::TimeoutSnafu { timeout_ms }.fail();
        }

        // The request that started this call no longer governs it.
        linked.detach();
        let task = self
            .tasks
            .create(self.name(), args, ctx.call_id.clone())
            .await;
        linked.link(&task.cancel_token);
        self.tasks
            .append_log(
                &task.id,
                format!("promoted after {timeout_ms}ms in the foreground"),
            )
            .await?;

        let finish = self.truncation.finisher(&ctx.call_id);
        self.tasks
            .run_in_background_with(
                &task.id,
                move |_token| async move {
                    let _linked = linked;
                    execution.await
                },
                self.config.background_timeout(),
                finish,
            )
            .await?;

        info!(
            tool = self.name(),
            task_id = %task.id,
            timeout_ms,
            "Promoted execution to background"
        );
        Ok(task_handle(
            &task.id,
            format!(
                "Still running after {timeout_ms}ms; continuing in the background as {}. \
                 Use get_task to check its status.",
                task.id
            ),
        ))
    }
}

#[async_trait]
impl Tool for WrappedTool {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    fn input_schema(&self) -> Value {
        self.schema.clone()
    }

    async fn execute(&self, input: Value, ctx: &mut ToolContext) -> Result<ToolOutput> {
        let (options, args) = ExecutionOptions::split(input);
        if options.background {
            if !self.config.allow_background {
                return tool_error::BackgroundNotAllowedSnafu {
                    tool_name: self.name(),
                }
                .fail();
            }
            return self.start_background(args, ctx).await;
        }

        let timeout = self.config.effective_timeout(options.timeout_ms);
        self.run_foreground(args, timeout, ctx).await
    }
}

impl std::fmt::Debug for WrappedTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WrappedTool")
            .field("name", &self.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Output returned in place of a result that will arrive later.
fn task_handle(task_id: &str, message: String) -> ToolOutput {
    ToolOutput::structured(json!({
        "task_id": task_id,
        "status": "running",
        "background": true,
        "message": message,
    }))
}

#[derive(Clone)]
struct Truncation {
    store: OutputStore,
    budget_chars: Option<usize>,
    tool_name: String,
}

impl Truncation {
    async fn apply(&self, output: ToolOutput, call_id: &str) -> ToolOutput {
        match self.budget_chars {
            Some(budget) => {
                truncate_if_needed(output, &self.tool_name, call_id, budget, &self.store).await
            }
            None => output,
        }
    }

    /// Truncation as a post-settle step for a background task.
    fn finisher(
        &self,
        call_id: &str,
    ) -> impl FnOnce(ToolOutput) -> BoxFuture<'static, ToolOutput> + Send + 'static {
        let truncation = self.clone();
        let call_id = call_id.to_string();
        move |output| Box::pin(async move { truncation.apply(output, &call_id).await })
    }
}

#[cfg(test)]
#[path = "wrapper.test.rs"]
mod tests;
