//! In-process terminal backend for tests.
//!
//! Understands a tiny shell dialect, one command per line:
//! - `echo <text>` prints the text
//! - `true` / `false` set the exit status
//! - `sleep <ms>` waits; a ^C byte cuts it short with status 130 and
//!   drops any input typed ahead
//! - `exit <n>` ends the process
//! - the completion-marker `printf` line prints the marker with the last
//!   status
//!
//! Anything else prints a "not found" line and sets status 127.

use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::sync::oneshot;

use crate::LaunchSpec;
use crate::SpawnedTerminal;
use crate::TerminalBackend;
use crate::TerminalProcess;
use crate::error::Result;
use crate::error::terminal_error;

/// Backend whose processes interpret their input in-process.
#[derive(Debug, Default)]
pub struct FakeBackend {
    opened: AtomicUsize,
    specs: StdMutex<Vec<LaunchSpec>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of processes launched so far.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn specs(&self) -> Vec<LaunchSpec> {
        self.specs.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TerminalBackend for FakeBackend {
    async fn open(&self, spec: &LaunchSpec) -> Result<SpawnedTerminal> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut specs) = self.specs.lock() {
            specs.push(spec.clone());
        }

        let (input_tx, input_rx) = mpsc::unbounded_channel::<Vec<u8>>();
        let (output_tx, output_rx) = mpsc::channel::<Vec<u8>>(256);
        let (exit_tx, exit_rx) = oneshot::channel::<i32>();
        tokio::spawn(interpret(input_rx, output_tx, exit_tx));

        Ok(SpawnedTerminal {
            process: Box::new(FakeProcess {
                input: input_tx,
                size: Arc::new(StdMutex::new((spec.cols, spec.rows))),
            }),
            output: output_rx,
            exit: exit_rx,
        })
    }
}

struct FakeProcess {
    input: mpsc::UnboundedSender<Vec<u8>>,
    size: Arc<StdMutex<(u16, u16)>>,
}

#[async_trait]
impl TerminalProcess for FakeProcess {
    async fn write(&self, data: &[u8]) -> Result<()> {
        self.input.send(data.to_vec()).map_err(|_| {
            terminal_error::IoSnafu {
                message: "fake terminal exited",
            }
            .build()
        })
    }

    fn resize(&self, cols: u16, rows: u16) -> Result<()> {
        if let Ok(mut size) = self.size.lock() {
            *size = (cols, rows);
        }
        Ok(())
    }

    fn kill(&self) -> Result<()> {
        let _ = self.input.send(b"exit 137\n".to_vec());
        Ok(())
    }
}

async fn interpret(
    mut input: mpsc::UnboundedReceiver<Vec<u8>>,
    output: mpsc::Sender<Vec<u8>>,
    exit: oneshot::Sender<i32>,
) {
    let mut status = 0;
    let mut pending = String::new();
    while let Some(bytes) = input.recv().await {
        if feed(&mut pending, &bytes) {
            status = 130;
        }
        while let Some(pos) = pending.find('\n') {
            let line: String = pending.drain(..=pos).collect();
            let line = line.trim();
            if let Some(code) = line.strip_prefix("exit") {
                let _ = exit.send(code.trim().parse().unwrap_or(status));
                return;
            }
            let printed = match line.strip_prefix("sleep ") {
                Some(ms) => {
                    let ms = ms.trim().parse().unwrap_or(0);
                    match sleep_interruptibly(ms, &mut input, &mut pending).await {
                        Some(true) => {
                            status = 130;
                            "^C\n".to_string()
                        }
                        Some(false) => {
                            status = 0;
                            String::new()
                        }
                        None => break,
                    }
                }
                None => {
                    let (printed, next) = run_line(line, status);
                    status = next;
                    printed
                }
            };
            if !printed.is_empty() && output.send(printed.into_bytes()).await.is_err() {
                return;
            }
        }
    }
    let _ = exit.send(status);
}

/// Append `bytes` to the line buffer. A ^C discards everything typed
/// before it; returns whether one was seen.
fn feed(pending: &mut String, bytes: &[u8]) -> bool {
    let text = String::from_utf8_lossy(bytes);
    match text.rfind('\x03') {
        Some(pos) => {
            pending.clear();
            pending.push_str(&text[pos + 1..]);
            true
        }
        None => {
            pending.push_str(&text);
            false
        }
    }
}

/// Returns `Some(true)` when interrupted, `None` when input closed.
async fn sleep_interruptibly(
    ms: u64,
    input: &mut mpsc::UnboundedReceiver<Vec<u8>>,
    pending: &mut String,
) -> Option<bool> {
    let sleep = tokio::time::sleep(Duration::from_millis(ms));
    tokio::pin!(sleep);
    loop {
        tokio::select! {
            _ = &mut sleep => return Some(false),
            bytes = input.recv() => {
                let bytes = bytes?;
                if feed(pending, &bytes) {
                    return Some(true);
                }
            }
        }
    }
}

fn run_line(line: &str, status: i32) -> (String, i32) {
    if line.is_empty() {
        return (String::new(), status);
    }
    if let Some(text) = line.strip_prefix("echo ") {
        return (format!("{text}\n"), 0);
    }
    if line.starts_with("printf '\\n__TOOLRUN_%s_%d__\\n' ") {
        let token = line
            .split_whitespace()
            .nth(2)
            .unwrap_or_default()
            .to_string();
        return (format!("\n__TOOLRUN_{token}_{status}__\n"), status);
    }
    match line {
        "true" => (String::new(), 0),
        "false" => (String::new(), 1),
        other => (format!("sh: {other}: not found\n"), 127),
    }
}
