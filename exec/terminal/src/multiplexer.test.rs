use super::*;
use crate::testing::FakeBackend;
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;
use std::sync::Mutex as StdMutex;

fn mux_with(config: TerminalConfig) -> (Arc<FakeBackend>, SessionMultiplexer) {
    let backend = Arc::new(FakeBackend::new());
    let mux = SessionMultiplexer::new(backend.clone(), config);
    (backend, mux)
}

fn mux() -> (Arc<FakeBackend>, SessionMultiplexer) {
    mux_with(TerminalConfig::default())
}

#[tokio::test]
async fn test_exec_returns_output_and_exit_code() {
    let (_, mux) = mux();

    let out = mux.exec("t1", "echo hello", None, CancellationToken::new()).await.unwrap();
    assert_eq!(
        out,
        CommandOutput {
            output: "hello".to_string(),
            exit_code: 0,
        }
    );

    let out = mux.exec("t1", "false", None, CancellationToken::new()).await.unwrap();
    assert_eq!(out.exit_code, 1);
    assert_eq!(out.output, "");
}

#[tokio::test]
async fn test_session_reused_across_calls() {
    let (backend, mux) = mux();

    mux.exec("t1", "echo a", None, CancellationToken::new()).await.unwrap();
    mux.exec("t1", "echo b", None, CancellationToken::new()).await.unwrap();
    mux.exec("t2", "echo c", None, CancellationToken::new()).await.unwrap();

    assert_eq!(backend.opened(), 2);
    let ids: Vec<String> = mux.list().await.into_iter().map(|s| s.id).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&"t1".to_string()));
    assert!(ids.contains(&"t2".to_string()));
}

#[tokio::test]
async fn test_unawaited_commands_keep_order() {
    let (_, mux) = mux();

    let (a, b) = tokio::join!(
        mux.exec("t1", "echo A", None, CancellationToken::new()),
        mux.exec("t1", "echo B", None, CancellationToken::new())
    );
    assert_eq!(a.unwrap().output, "A");
    assert_eq!(b.unwrap().output, "B");

    let read = mux.read("t1", 0).await.unwrap();
    assert_eq!(read.output, "A\nB\n");
    assert!(!read.closed);
}

#[tokio::test]
async fn test_concurrent_jobs_run_in_submission_order() {
    let (_, mux) = mux();
    let session = mux.get_or_create("t1", &OpenOptions::default()).await.unwrap();
    let log = Arc::new(StdMutex::new(Vec::new()));

    let jobs = (0..8u64).map(|i| {
        let log = Arc::clone(&log);
        session.enqueue(move |_session| async move {
            // Earlier jobs sleep longer; order must still hold.
            tokio::time::sleep(Duration::from_millis(40 - i * 5)).await;
            log.lock().unwrap().push(i);
            i
        })
    });
    let results = futures::future::join_all(jobs).await;

    let results: Vec<u64> = results.into_iter().map(|r| r.unwrap()).collect();
    assert_eq!(results, (0..8).collect::<Vec<_>>());
    assert_eq!(*log.lock().unwrap(), (0..8).collect::<Vec<_>>());
    assert_eq!(session.active_commands(), 0);
}

#[tokio::test]
async fn test_panicking_job_does_not_block_queue() {
    let (_, mux) = mux();

    let failed = mux
        .enqueue("t1", |_session| async {
            panic!("boom");
        })
        .await;
    assert!(matches!(
        failed,
        Err(crate::TerminalError::CommandAborted { .. })
    ));

    let out = mux.exec("t1", "echo after", None, CancellationToken::new()).await.unwrap();
    assert_eq!(out.output, "after");
}

#[tokio::test]
async fn test_failing_command_does_not_block_queue() {
    let (_, mux) = mux();

    let out = mux.exec("t1", "nosuchcmd", None, CancellationToken::new()).await.unwrap();
    assert_eq!(out.exit_code, 127);
    assert!(out.output.contains("not found"));

    let out = mux.exec("t1", "echo next", None, CancellationToken::new()).await.unwrap();
    assert_eq!(out.exit_code, 0);
}

#[tokio::test]
async fn test_exec_timeout() {
    let (_, mux) = mux();

    let result = mux
        .exec("t1", "sleep 500", Some(Duration::from_millis(30)), CancellationToken::new())
        .await;
    assert!(matches!(
        result,
        Err(crate::TerminalError::CommandTimeout { .. })
    ));
}

#[tokio::test]
async fn test_read_offsets() {
    let (_, mux) = mux();
    mux.exec("t1", "echo one", None, CancellationToken::new()).await.unwrap();

    let first = mux.read("t1", 0).await.unwrap();
    assert_eq!(first.output, "one\n");

    mux.exec("t1", "echo two", None, CancellationToken::new()).await.unwrap();
    let second = mux.read("t1", first.next_offset).await.unwrap();
    assert_eq!(second.output, "two\n");

    let empty = mux.read("t1", second.next_offset).await.unwrap();
    assert_eq!(empty.output, "");
}

#[tokio::test]
async fn test_read_unknown_session() {
    let (backend, mux) = mux();
    let err = mux.read("missing", 0).await.unwrap_err();
    assert!(matches!(err, crate::TerminalError::SessionNotFound { .. }));
    assert_eq!(backend.opened(), 0);
}

#[tokio::test]
async fn test_write_creates_session_lazily() {
    let (backend, mux) = mux();

    mux.write("t9", b"echo raw\n").await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(backend.opened(), 1);
    let read = mux.read("t9", 0).await.unwrap();
    assert_eq!(read.output, "raw\n");
}

#[tokio::test]
async fn test_open_generates_id_and_applies_size() {
    let (backend, mux) = mux();

    let id = mux.open(&OpenOptions::with_size(100, 30)).await.unwrap();
    assert!(id.starts_with("term-"));
    assert_eq!(backend.specs()[0].cols, 100);
    assert_eq!(backend.specs()[0].rows, 30);

    mux.resize(&id, 80, 24).await.unwrap();
    let info = mux.list().await.into_iter().find(|s| s.id == id).unwrap();
    assert_eq!((info.cols, info.rows), (80, 24));
    assert_eq!(backend.opened(), 1);
}

#[tokio::test]
async fn test_close_marks_closed_and_removes() {
    let (_, mux) = mux();
    let session = mux.get_or_create("t1", &OpenOptions::default()).await.unwrap();

    mux.close("t1").await.unwrap();

    assert!(session.is_closed().await);
    assert!(mux.list().await.is_empty());
    let err = mux.close("t1").await.unwrap_err();
    assert!(matches!(err, crate::TerminalError::SessionNotFound { .. }));
}

#[tokio::test]
async fn test_exited_process_reports_close_reason() {
    let (backend, mux) = mux();
    mux.write("t1", b"exit 3\n").await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let read = mux.read("t1", 0).await.unwrap();
    assert!(read.closed);
    assert_eq!(
        read.close_reason.as_deref(),
        Some("process exited with code 3")
    );

    // A closed session is replaced on next use.
    let out = mux.exec("t1", "echo back", None, CancellationToken::new()).await.unwrap();
    assert_eq!(out.output, "back");
    assert_eq!(backend.opened(), 2);
}

#[tokio::test]
async fn test_sweep_evicts_idle_sessions_except_target() {
    let (_, mux) = mux_with(TerminalConfig {
        idle_ttl_ms: 0,
        ..Default::default()
    });
    let old = mux.get_or_create("old", &OpenOptions::default()).await.unwrap();

    mux.exec("fresh", "echo hi", None, CancellationToken::new()).await.unwrap();

    assert!(old.is_closed().await);
    let ids: Vec<String> = mux.list().await.into_iter().map(|s| s.id).collect();
    assert_eq!(ids, vec!["fresh".to_string()]);
}

#[tokio::test]
async fn test_sweep_keeps_busy_and_recent_sessions() {
    let (_, mux) = mux();
    mux.get_or_create("recent", &OpenOptions::default())
        .await
        .unwrap();

    assert!(mux.sweep_idle(None).await.is_empty());
    assert_eq!(mux.list().await.len(), 1);
}

#[tokio::test]
async fn test_sweep_skips_session_with_active_command() {
    let (_, mux) = mux_with(TerminalConfig {
        idle_ttl_ms: 0,
        ..Default::default()
    });
    let mux = Arc::new(mux);
    let runner = Arc::clone(&mux);
    let handle = tokio::spawn(async move {
        runner
            .exec("busy", "sleep 100", Some(Duration::from_secs(5)), CancellationToken::new())
            .await
    });
    tokio::time::sleep(Duration::from_millis(20)).await;

    let evicted = mux.sweep_idle(None).await;
    assert!(evicted.is_empty());

    assert_eq!(handle.await.unwrap().unwrap().exit_code, 0);
}

#[tokio::test]
async fn test_buffer_bounded_by_config() {
    let (_, mux) = mux_with(TerminalConfig {
        max_buffer_entries: 2,
        ..Default::default()
    });
    mux.write("t1", b"echo 1\necho 2\necho 3\n").await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let read = mux.read("t1", 0).await.unwrap();
    assert_eq!(read.output, "2\n3\n");
    assert_eq!(read.next_offset, 3);
}

#[tokio::test]
async fn test_cancelled_exec_interrupts_and_frees_session() {
    let (_, mux) = mux();
    let mux = Arc::new(mux);
    let cancel = CancellationToken::new();
    let runner = Arc::clone(&mux);
    let token = cancel.clone();
    let handle =
        tokio::spawn(async move { runner.exec("t1", "sleep 5000", None, token).await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();

    let result = handle.await.unwrap();
    assert!(matches!(
        result,
        Err(crate::TerminalError::CommandCancelled { .. })
    ));

    let start = std::time::Instant::now();
    let out = mux
        .exec("t1", "echo next", None, CancellationToken::new())
        .await
        .unwrap();
    assert!(start.elapsed() < Duration::from_secs(1));
    assert!(out.output.ends_with("next"));
    assert_eq!(out.exit_code, 0);
    assert_eq!(mux.list().await[0].active_commands, 0);
}

#[tokio::test]
async fn test_cancelled_queued_exec_is_skipped() {
    let (_, mux) = mux();
    let mux = Arc::new(mux);
    let runner = Arc::clone(&mux);
    let first = tokio::spawn(async move {
        runner
            .exec("t1", "sleep 100", None, CancellationToken::new())
            .await
    });
    tokio::time::sleep(Duration::from_millis(10)).await;

    let cancel = CancellationToken::new();
    cancel.cancel();
    let skipped = mux.exec("t1", "echo never", None, cancel).await;
    assert!(matches!(
        skipped,
        Err(crate::TerminalError::CommandCancelled { .. })
    ));

    assert_eq!(first.await.unwrap().unwrap().exit_code, 0);
    let read = mux.read("t1", 0).await.unwrap();
    assert!(!read.output.contains("never"));
}

/// Process whose input is gone but which has not exited.
struct BrokenInput {
    _output: tokio::sync::mpsc::Sender<Vec<u8>>,
    _exit: StdMutex<tokio::sync::oneshot::Sender<i32>>,
}

#[async_trait::async_trait]
impl crate::TerminalProcess for BrokenInput {
    async fn write(&self, _data: &[u8]) -> Result<()> {
        crate::error::terminal_error::IoSnafu {
            message: "broken pipe",
        }
        .fail()
    }

    fn resize(&self, _cols: u16, _rows: u16) -> Result<()> {
        Ok(())
    }

    fn kill(&self) -> Result<()> {
        Ok(())
    }
}

struct BrokenInputBackend;

#[async_trait::async_trait]
impl TerminalBackend for BrokenInputBackend {
    async fn open(&self, _spec: &LaunchSpec) -> Result<crate::SpawnedTerminal> {
        let (output_tx, output_rx) = tokio::sync::mpsc::channel(1);
        let (exit_tx, exit_rx) = tokio::sync::oneshot::channel();
        Ok(crate::SpawnedTerminal {
            process: Box::new(BrokenInput {
                _output: output_tx,
                _exit: StdMutex::new(exit_tx),
            }),
            output: output_rx,
            exit: exit_rx,
        })
    }
}

#[tokio::test]
async fn test_failed_write_fails_exec_fast() {
    let mux = SessionMultiplexer::new(Arc::new(BrokenInputBackend), TerminalConfig::default());

    let start = std::time::Instant::now();
    let result = mux
        .exec("t1", "echo hi", None, CancellationToken::new())
        .await;
    assert!(matches!(result, Err(crate::TerminalError::Io { .. })));
    assert!(start.elapsed() < Duration::from_secs(1));
    assert_eq!(mux.list().await[0].active_commands, 0);
}

#[tokio::test]
async fn test_reuse_refreshes_idle_clock() {
    let (_, mux) = mux_with(TerminalConfig {
        idle_ttl_ms: 50,
        ..Default::default()
    });
    mux.get_or_create("t1", &OpenOptions::default())
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(80)).await;

    let session = mux.get_or_create("t1", &OpenOptions::default()).await.unwrap();
    assert!(mux.sweep_idle(None).await.is_empty());
    assert!(!session.is_closed().await);
}
