use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::sync::Weak;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;

use chrono::DateTime;
use chrono::Utc;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::sync::Notify;
use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::warn;

use crate::SpawnedTerminal;
use crate::TerminalProcess;
use crate::buffer::OutputBuffer;
use crate::error::Result;
use crate::error::terminal_error;
use crate::marker;

type Job = BoxFuture<'static, ()>;

const INTERRUPT: &[u8] = b"\x03";

/// Result of a command run through the completion-marker protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutput {
    pub output: String,
    pub exit_code: i32,
}

/// Output read from a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadResult {
    pub output: String,
    /// Pass back as `offset` to continue where this read stopped.
    pub next_offset: u64,
    pub closed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_reason: Option<String>,
}

/// Summary of a live session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionInfo {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub active_commands: usize,
    pub idle_ms: i64,
    pub cols: u16,
    pub rows: u16,
    pub closed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_reason: Option<String>,
}

#[derive(Debug)]
struct SessionState {
    buffer: OutputBuffer,
    last_used: Instant,
    closed: bool,
    close_reason: Option<String>,
    cols: u16,
    rows: u16,
}

/// One terminal process plus its command queue and output buffer.
pub struct Session {
    id: String,
    created_at: DateTime<Utc>,
    state: Mutex<SessionState>,
    output_notify: Notify,
    active: AtomicUsize,
    process: Box<dyn TerminalProcess>,
    jobs: StdMutex<Option<mpsc::UnboundedSender<Job>>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("active", &self.active.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Wrap a spawned terminal and start its queue worker and output pump.
    pub(crate) fn start(
        id: String,
        spawned: SpawnedTerminal,
        buffer_capacity: usize,
        cols: u16,
        rows: u16,
    ) -> Arc<Self> {
        let SpawnedTerminal {
            process,
            mut output,
            exit,
        } = spawned;
        let (jobs_tx, mut jobs_rx) = mpsc::unbounded_channel::<Job>();

        let session = Arc::new(Self {
            id,
            created_at: Utc::now(),
            state: Mutex::new(SessionState {
                buffer: OutputBuffer::new(buffer_capacity),
                last_used: Instant::now(),
                closed: false,
                close_reason: None,
                cols,
                rows,
            }),
            output_notify: Notify::new(),
            active: AtomicUsize::new(0),
            process,
            jobs: StdMutex::new(Some(jobs_tx)),
        });

        // Commands run one at a time, in the order they were queued.
        tokio::spawn(async move {
            while let Some(job) = jobs_rx.recv().await {
                job.await;
            }
        });

        let weak = Arc::downgrade(&session);
        tokio::spawn(async move {
            while let Some(chunk) = output.recv().await {
                let Some(session) = weak.upgrade() else {
                    break;
                };
                session.state.lock().await.buffer.push(chunk);
                session.output_notify.notify_waiters();
            }
        });

        let weak: Weak<Session> = Arc::downgrade(&session);
        tokio::spawn(async move {
            let reason = match exit.await {
                Ok(code) => format!("process exited with code {code}"),
                Err(_) => "process exited".to_string(),
            };
            if let Some(session) = weak.upgrade() {
                session.mark_closed(reason).await;
            }
        });

        session
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn active_commands(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub async fn size(&self) -> (u16, u16) {
        let state = self.state.lock().await;
        (state.cols, state.rows)
    }

    pub async fn is_closed(&self) -> bool {
        self.state.lock().await.closed
    }

    /// Idle if no command is queued or running and it was last used at
    /// least `ttl` ago.
    pub(crate) async fn is_idle(&self, ttl: Duration) -> bool {
        if self.active_commands() > 0 {
            return false;
        }
        self.state.lock().await.last_used.elapsed() >= ttl
    }

    pub(crate) async fn touch(&self) {
        self.state.lock().await.last_used = Instant::now();
    }

    /// Queue `f` behind every command already submitted to this session and
    /// wait for its result.
    ///
    /// A command that fails or panics does not stall the queue.
    pub async fn enqueue<F, Fut, T>(self: &Arc<Self>, f: F) -> Result<T>
    where
        F: FnOnce(Arc<Session>) -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (result_tx, result_rx) = oneshot::channel();
        let session = Arc::clone(self);
        let job: Job = Box::pin(async move {
            let result = AssertUnwindSafe(f(Arc::clone(&session)))
                .catch_unwind()
                .await;
            session.active.fetch_sub(1, Ordering::SeqCst);
            session.touch().await;
            match result {
                Ok(value) => {
                    let _ = result_tx.send(value);
                }
                Err(_) => warn!(session_id = %session.id, "Queued command panicked"),
            }
        });

        self.active.fetch_add(1, Ordering::SeqCst);
        if let Err(job) = self.send_job(job) {
            self.active.fetch_sub(1, Ordering::SeqCst);
            drop(job);
            return Err(self.closed_error().await);
        }
        self.touch().await;

        result_rx.await.map_err(|_| {
            terminal_error::CommandAbortedSnafu {
                session_id: self.id.clone(),
            }
            .build()
        })
    }

    fn send_job(&self, job: Job) -> std::result::Result<(), Job> {
        let Ok(guard) = self.jobs.lock() else {
            return Err(job);
        };
        match guard.as_ref() {
            Some(tx) => tx.send(job).map_err(|err| err.0),
            None => Err(job),
        }
    }

    async fn closed_error(&self) -> crate::TerminalError {
        let reason = self
            .state
            .lock()
            .await
            .close_reason
            .clone()
            .unwrap_or_else(|| "closed".to_string());
        terminal_error::ClosedSnafu {
            session_id: self.id.clone(),
            reason,
        }
        .build()
    }

    /// Write raw input to the terminal.
    pub async fn write(&self, data: &[u8]) -> Result<()> {
        if self.is_closed().await {
            return Err(self.closed_error().await);
        }
        self.touch().await;
        self.process.write(data).await
    }

    pub async fn resize(&self, cols: u16, rows: u16) -> Result<()> {
        self.process.resize(cols, rows)?;
        let mut state = self.state.lock().await;
        state.cols = cols;
        state.rows = rows;
        state.last_used = Instant::now();
        Ok(())
    }

    /// Output at or after `offset`, with completion markers removed.
    pub async fn read(&self, offset: u64) -> ReadResult {
        let mut state = self.state.lock().await;
        state.last_used = Instant::now();
        ReadResult {
            output: marker::strip_markers(&state.buffer.text_since(offset)),
            next_offset: state.buffer.end_offset(),
            closed: state.closed,
            close_reason: state.close_reason.clone(),
        }
    }

    /// Run `command` and wait for its completion marker.
    ///
    /// Call through [`Session::enqueue`] so commands do not interleave. When
    /// `cancel` fires or `timeout` passes, the command is interrupted so the
    /// next queued command gets a usable shell.
    pub async fn run_marked(
        &self,
        command: &str,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<CommandOutput> {
        if cancel.is_cancelled() {
            return terminal_error::CommandCancelledSnafu {
                session_id: self.id.clone(),
            }
            .fail();
        }

        let token = marker::new_token();
        let start = self.state.lock().await.buffer.end_offset();

        let mut input = command.trim_end_matches('\n').to_string();
        input.push('\n');
        input.push_str(&marker::marker_command(&token));
        self.write(input.as_bytes()).await?;
        debug!(session_id = %self.id, token = %token, "Command written");

        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let notified = self.output_notify.notified();
            {
                let state = self.state.lock().await;
                if let Some(found) = marker::find_marker(&state.buffer.text_since(start), &token)
                {
                    return Ok(CommandOutput {
                        output: found.output,
                        exit_code: found.exit_code,
                    });
                }
                if state.closed {
                    return terminal_error::ClosedSnafu {
                        session_id: self.id.clone(),
                        reason: state
                            .close_reason
                            .clone()
                            .unwrap_or_else(|| "closed".to_string()),
                    }
                    .fail();
                }
            }
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    self.interrupt().await;
                    return terminal_error::CommandCancelledSnafu {
                        session_id: self.id.clone(),
                    }
                    .fail();
                }
                _ = tokio::time::sleep_until(deadline) => {
                    self.interrupt().await;
                    return terminal_error::CommandTimeoutSnafu {
                        session_id: self.id.clone(),
                        timeout_ms: timeout.as_millis() as i64,
                    }
                    .fail();
                }
                _ = notified => {}
            }
        }
    }

    /// Send ^C to whatever the shell is running.
    async fn interrupt(&self) {
        debug!(session_id = %self.id, "Interrupting command");
        if let Err(err) = self.process.write(INTERRUPT).await {
            warn!(session_id = %self.id, error = %err, "Failed to interrupt command");
        }
    }

    pub async fn info(&self) -> SessionInfo {
        let state = self.state.lock().await;
        SessionInfo {
            id: self.id.clone(),
            created_at: self.created_at,
            active_commands: self.active_commands(),
            idle_ms: state.last_used.elapsed().as_millis() as i64,
            cols: state.cols,
            rows: state.rows,
            closed: state.closed,
            close_reason: state.close_reason.clone(),
        }
    }

    async fn mark_closed(&self, reason: String) {
        {
            let mut state = self.state.lock().await;
            if !state.closed {
                debug!(session_id = %self.id, reason = %reason, "Session closed");
                state.closed = true;
                state.close_reason = Some(reason);
            }
        }
        self.output_notify.notify_waiters();
    }

    /// Kill the process and stop accepting commands. Queued commands still
    /// run and see a closed session.
    pub(crate) async fn shutdown(&self, reason: &str) {
        if let Ok(mut jobs) = self.jobs.lock() {
            jobs.take();
        }
        self.mark_closed(reason.to_string()).await;
        if let Err(err) = self.process.kill() {
            warn!(session_id = %self.id, error = %err, "Failed to kill terminal process");
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let _ = self.process.kill();
    }
}
