use super::terminal_error::*;
use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_status_codes() {
    assert_eq!(
        SessionNotFoundSnafu { session_id: "t1" }.build().status_code(),
        StatusCode::SessionNotFound
    );
    assert_eq!(
        CommandTimeoutSnafu {
            session_id: "t1",
            timeout_ms: 10i64,
        }
        .build()
        .status_code(),
        StatusCode::Timeout
    );
    assert_eq!(
        CommandCancelledSnafu { session_id: "t1" }
            .build()
            .status_code(),
        StatusCode::Cancelled
    );
    assert_eq!(
        SpawnSnafu { message: "no pty" }.build().status_code(),
        StatusCode::TerminalError
    );
}

#[test]
fn test_display() {
    let err = ClosedSnafu {
        session_id: "t1",
        reason: "process exited with code 0",
    }
    .build();
    assert_eq!(
        err.to_string(),
        "Session t1 is closed: process exited with code 0"
    );
}
