use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use toolrun_protocol::TerminalConfig;
use tracing::debug;
use tracing::info;

use crate::CommandOutput;
use crate::LaunchSpec;
use crate::ReadResult;
use crate::Session;
use crate::SessionInfo;
use crate::TerminalBackend;
use crate::error::Result;
use crate::error::terminal_error;

/// Options for opening (or reusing) a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OpenOptions {
    /// Session id; generated when absent.
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub cols: Option<u16>,
    #[serde(default)]
    pub rows: Option<u16>,
    #[serde(default)]
    pub cwd: Option<PathBuf>,
}

impl OpenOptions {
    pub fn with_size(cols: u16, rows: u16) -> Self {
        Self {
            cols: Some(cols),
            rows: Some(rows),
            ..Default::default()
        }
    }

    fn has_size(&self) -> bool {
        self.cols.is_some() || self.rows.is_some()
    }
}

/// Registry of terminal sessions keyed by id.
pub struct SessionMultiplexer {
    backend: Arc<dyn TerminalBackend>,
    config: TerminalConfig,
    sessions: Mutex<HashMap<String, Arc<Session>>>,
}

impl SessionMultiplexer {
    pub fn new(backend: Arc<dyn TerminalBackend>, config: TerminalConfig) -> Self {
        Self {
            backend,
            config,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &TerminalConfig {
        &self.config
    }

    /// Return the live session `id`, opening it if needed.
    ///
    /// An existing session is resized when `options` carries a size. A
    /// closed session under the same id is replaced. Idle sessions other
    /// than `id` are swept first.
    pub async fn get_or_create(&self, id: &str, options: &OpenOptions) -> Result<Arc<Session>> {
        self.sweep_idle(Some(id)).await;

        let mut sessions = self.sessions.lock().await;
        if let Some(session) = sessions.get(id).cloned() {
            if !session.is_closed().await {
                // Keep it out of a concurrent sweep until the caller queues work.
                session.touch().await;
                if options.has_size() {
                    let (cols, rows) = session.size().await;
                    session
                        .resize(options.cols.unwrap_or(cols), options.rows.unwrap_or(rows))
                        .await?;
                }
                return Ok(session);
            }
            debug!(session_id = id, "Replacing closed session");
            sessions.remove(id);
        }

        let spec = LaunchSpec {
            shell: self.config.resolved_shell(),
            cols: options.cols.unwrap_or_else(|| dimension(self.config.default_cols)),
            rows: options.rows.unwrap_or_else(|| dimension(self.config.default_rows)),
            cwd: options.cwd.clone(),
        };
        let spawned = self.backend.open(&spec).await?;
        let session = Session::start(
            id.to_string(),
            spawned,
            self.config.buffer_capacity(),
            spec.cols,
            spec.rows,
        );
        sessions.insert(id.to_string(), Arc::clone(&session));
        info!(session_id = id, shell = %spec.shell, "Opened terminal session");
        Ok(session)
    }

    /// Open a session and return its id.
    pub async fn open(&self, options: &OpenOptions) -> Result<String> {
        let id = options
            .session_id
            .clone()
            .unwrap_or_else(generate_session_id);
        self.get_or_create(&id, options).await?;
        Ok(id)
    }

    /// Run `f` on session `id` after every command already queued there.
    pub async fn enqueue<F, Fut, T>(&self, id: &str, f: F) -> Result<T>
    where
        F: FnOnce(Arc<Session>) -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let session = self.get_or_create(id, &OpenOptions::default()).await?;
        session.enqueue(f).await
    }

    /// Run a shell command on session `id` and wait for it to finish.
    ///
    /// Cancelling `cancel` interrupts the command, or skips it if it is
    /// still queued, and frees the session for the next command.
    pub async fn exec(
        &self,
        id: &str,
        command: &str,
        timeout: Option<Duration>,
        cancel: CancellationToken,
    ) -> Result<CommandOutput> {
        let timeout = timeout.unwrap_or_else(|| {
            Duration::from_millis(self.config.command_timeout_ms.max(0) as u64)
        });
        let command = command.to_string();
        self.enqueue(id, move |session| async move {
            session.run_marked(&command, timeout, &cancel).await
        })
        .await?
    }

    /// Read buffered output of an existing session.
    pub async fn read(&self, id: &str, offset: u64) -> Result<ReadResult> {
        let session = self.existing(id).await?;
        Ok(session.read(offset).await)
    }

    pub async fn write(&self, id: &str, data: &[u8]) -> Result<()> {
        let session = self.get_or_create(id, &OpenOptions::default()).await?;
        session.write(data).await
    }

    pub async fn resize(&self, id: &str, cols: u16, rows: u16) -> Result<()> {
        self.get_or_create(id, &OpenOptions::with_size(cols, rows))
            .await
            .map(|_| ())
    }

    pub async fn list(&self) -> Vec<SessionInfo> {
        let sessions: Vec<Arc<Session>> = self.sessions.lock().await.values().cloned().collect();
        let mut infos = Vec::with_capacity(sessions.len());
        for session in sessions {
            infos.push(session.info().await);
        }
        infos.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        infos
    }

    /// Close and remove session `id`.
    pub async fn close(&self, id: &str) -> Result<()> {
        let session = self
            .sessions
            .lock()
            .await
            .remove(id)
            .ok_or_else(|| terminal_error::SessionNotFoundSnafu { session_id: id }.build())?;
        session.shutdown("closed by request").await;
        info!(session_id = id, "Closed terminal session");
        Ok(())
    }

    /// Evict sessions with no active command that have been unused for at
    /// least the idle TTL. `exclude` is never evicted.
    pub async fn sweep_idle(&self, exclude: Option<&str>) -> Vec<String> {
        let ttl = Duration::from_millis(self.config.idle_ttl_ms.max(0) as u64);
        let evicted: Vec<Arc<Session>> = {
            let mut sessions = self.sessions.lock().await;
            let mut expired = Vec::new();
            for (id, session) in sessions.iter() {
                if exclude == Some(id.as_str()) {
                    continue;
                }
                if session.is_idle(ttl).await {
                    expired.push(id.clone());
                }
            }
            expired
                .iter()
                .filter_map(|id| sessions.remove(id))
                .collect()
        };

        let mut ids = Vec::with_capacity(evicted.len());
        for session in evicted {
            session.shutdown("evicted after idle timeout").await;
            info!(session_id = %session.id(), "Evicted idle terminal session");
            ids.push(session.id().to_string());
        }
        ids
    }

    /// Close every session.
    pub async fn shutdown(&self) {
        let sessions: Vec<Arc<Session>> = self.sessions.lock().await.drain().map(|(_, s)| s).collect();
        for session in sessions {
            session.shutdown("runtime shut down").await;
        }
    }

    async fn existing(&self, id: &str) -> Result<Arc<Session>> {
        self.sessions
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| terminal_error::SessionNotFoundSnafu { session_id: id }.build())
    }
}

fn dimension(value: i32) -> u16 {
    value.clamp(1, i32::from(u16::MAX)) as u16
}

fn generate_session_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("term-{}", &hex[..12])
}

#[cfg(test)]
#[path = "multiplexer.test.rs"]
mod tests;
