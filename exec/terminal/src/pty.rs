//! Terminal backend on a native pseudo-terminal.

use std::io::ErrorKind;
use std::io::Read;
use std::io::Write;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use async_trait::async_trait;
use portable_pty::ChildKiller;
use portable_pty::CommandBuilder;
use portable_pty::MasterPty;
use portable_pty::PtySize;
use portable_pty::native_pty_system;
use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tracing::debug;
use tracing::warn;

use crate::LaunchSpec;
use crate::SpawnedTerminal;
use crate::TerminalBackend;
use crate::TerminalProcess;
use crate::error::Result;
use crate::error::terminal_error;

/// Shell setup written right after launch: no input echo and no prompts, so
/// the output stream carries only what commands print.
const SETUP_INPUT: &str = "stty -echo; PS1=''; PS2=''; export PS1 PS2\n";

/// Launches an interactive shell on a native PTY.
#[derive(Debug, Default, Clone, Copy)]
pub struct PtyBackend;

impl PtyBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TerminalBackend for PtyBackend {
    async fn open(&self, spec: &LaunchSpec) -> Result<SpawnedTerminal> {
        let pty_system = native_pty_system();
        let pair = pty_system
            .openpty(pty_size(spec.cols, spec.rows))
            .map_err(spawn_error)?;

        let mut command = CommandBuilder::new(&spec.shell);
        command.env("TERM", "dumb");
        if let Some(cwd) = &spec.cwd {
            command.cwd(cwd);
        }

        let mut child = pair.slave.spawn_command(command).map_err(spawn_error)?;
        drop(pair.slave);
        let killer = child.clone_killer();

        let (output_tx, output_rx) = mpsc::channel::<Vec<u8>>(256);
        let mut reader = pair.master.try_clone_reader().map_err(spawn_error)?;
        tokio::task::spawn_blocking(move || {
            let mut buf = [0u8; 8192];
            loop {
                match reader.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        if output_tx.blocking_send(buf[..n].to_vec()).is_err() {
                            break;
                        }
                    }
                    Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                        std::thread::sleep(Duration::from_millis(5));
                        continue;
                    }
                    Err(_) => break,
                }
            }
        });

        let writer = Arc::new(StdMutex::new(pair.master.take_writer().map_err(spawn_error)?));
        let (writer_tx, mut writer_rx) = mpsc::channel::<WriteRequest>(128);
        tokio::spawn(async move {
            while let Some((bytes, done)) = writer_rx.recv().await {
                let writer = Arc::clone(&writer);
                let written = tokio::task::spawn_blocking(move || {
                    let mut guard = writer
                        .lock()
                        .map_err(|_| std::io::Error::other("terminal writer poisoned"))?;
                    guard.write_all(&bytes)?;
                    guard.flush()
                })
                .await
                .unwrap_or_else(|err| Err(std::io::Error::other(err)));

                let failed = written.is_err();
                if let Err(err) = &written {
                    warn!(error = %err, "Failed to write to PTY, closing input");
                }
                let _ = done.send(written);
                if failed {
                    break;
                }
            }
        });

        let (exit_tx, exit_rx) = oneshot::channel::<i32>();
        tokio::task::spawn_blocking(move || {
            let code = match child.wait() {
                Ok(status) => status.exit_code() as i32,
                Err(_) => -1,
            };
            let _ = exit_tx.send(code);
        });

        let process = PtyProcess {
            writer_tx,
            master: StdMutex::new(pair.master),
            killer: StdMutex::new(killer),
        };
        process.write(SETUP_INPUT.as_bytes()).await?;
        debug!(shell = %spec.shell, cols = spec.cols, rows = spec.rows, "Spawned PTY shell");

        Ok(SpawnedTerminal {
            process: Box::new(process),
            output: output_rx,
            exit: exit_rx,
        })
    }
}

/// Bytes to write plus where to report the outcome.
type WriteRequest = (Vec<u8>, oneshot::Sender<std::io::Result<()>>);

struct PtyProcess {
    writer_tx: mpsc::Sender<WriteRequest>,
    master: StdMutex<Box<dyn MasterPty + Send>>,
    killer: StdMutex<Box<dyn ChildKiller + Send + Sync>>,
}

#[async_trait]
impl TerminalProcess for PtyProcess {
    async fn write(&self, data: &[u8]) -> Result<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.writer_tx
            .send((data.to_vec(), done_tx))
            .await
            .map_err(|_| input_closed())?;
        match done_rx.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => terminal_error::IoSnafu {
                message: err.to_string(),
            }
            .fail(),
            Err(_) => Err(input_closed()),
        }
    }

    fn resize(&self, cols: u16, rows: u16) -> Result<()> {
        let master = self.master.lock().map_err(|_| {
            terminal_error::IoSnafu {
                message: "terminal handle poisoned",
            }
            .build()
        })?;
        master.resize(pty_size(cols, rows)).map_err(|err| {
            terminal_error::IoSnafu {
                message: err.to_string(),
            }
            .build()
        })
    }

    fn kill(&self) -> Result<()> {
        let mut killer = self.killer.lock().map_err(|_| {
            terminal_error::IoSnafu {
                message: "terminal handle poisoned",
            }
            .build()
        })?;
        match killer.kill() {
            Ok(()) => Ok(()),
            // Already exited.
            Err(err) if err.kind() == ErrorKind::InvalidInput => Ok(()),
            Err(err) => terminal_error::IoSnafu {
                message: err.to_string(),
            }
            .fail(),
        }
    }
}

fn pty_size(cols: u16, rows: u16) -> PtySize {
    PtySize {
        rows,
        cols,
        pixel_width: 0,
        pixel_height: 0,
    }
}

fn input_closed() -> crate::TerminalError {
    terminal_error::IoSnafu {
        message: "terminal input closed",
    }
    .build()
}

fn spawn_error(err: anyhow::Error) -> crate::TerminalError {
    terminal_error::SpawnSnafu {
        message: err.to_string(),
    }
    .build()
}

#[cfg(test)]
#[path = "pty.test.rs"]
mod tests;
