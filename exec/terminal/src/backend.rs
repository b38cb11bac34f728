use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::sync::oneshot;

use crate::error::Result;

/// How to launch a terminal process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub shell: String,
    pub cols: u16,
    pub rows: u16,
    pub cwd: Option<PathBuf>,
}

/// Control handle for a running terminal process.
#[async_trait]
pub trait TerminalProcess: Send + Sync {
    /// Send raw input.
    async fn write(&self, data: &[u8]) -> Result<()>;

    fn resize(&self, cols: u16, rows: u16) -> Result<()>;

    /// Terminate the process. Idempotent.
    fn kill(&self) -> Result<()>;
}

/// A freshly launched terminal.
pub struct SpawnedTerminal {
    pub process: Box<dyn TerminalProcess>,
    /// Raw output chunks; closes when the process output ends.
    pub output: mpsc::Receiver<Vec<u8>>,
    /// Exit status, sent once the process exits.
    pub exit: oneshot::Receiver<i32>,
}

impl std::fmt::Debug for SpawnedTerminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpawnedTerminal").finish_non_exhaustive()
    }
}

/// Launches terminal processes.
#[async_trait]
pub trait TerminalBackend: Send + Sync {
    async fn open(&self, spec: &LaunchSpec) -> Result<SpawnedTerminal>;
}
