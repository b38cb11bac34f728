use super::*;
use crate::SessionMultiplexer;
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;
use toolrun_protocol::TerminalConfig;

fn sh_config() -> TerminalConfig {
    TerminalConfig {
        shell: Some("/bin/sh".to_string()),
        ..Default::default()
    }
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_pty_exec_reports_output_and_status() {
    let mux = SessionMultiplexer::new(Arc::new(PtyBackend::new()), sh_config());

    let ok = mux
        .exec("pty-1", "echo hello", Some(Duration::from_secs(10)), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(ok.exit_code, 0);
    assert!(ok.output.contains("hello"));

    let failed = mux
        .exec("pty-1", "false", Some(Duration::from_secs(10)), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(failed.exit_code, 1);

    mux.close("pty-1").await.unwrap();
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_pty_session_keeps_shell_state() {
    let mux = SessionMultiplexer::new(Arc::new(PtyBackend::new()), sh_config());

    mux.exec("pty-2", "FOO=bar", Some(Duration::from_secs(10)), CancellationToken::new())
        .await
        .unwrap();
    let out = mux
        .exec("pty-2", "echo $FOO", Some(Duration::from_secs(10)), CancellationToken::new())
        .await
        .unwrap();
    assert!(out.output.contains("bar"));

    mux.shutdown().await;
}
