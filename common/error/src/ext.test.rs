use super::*;

#[derive(Debug)]
struct TestError {
    message: &'static str,
    code: StatusCode,
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for TestError {}

impl ErrorExt for TestError {
    fn status_code(&self) -> StatusCode {
        self.code
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[test]
fn test_output_msg_hides_internal() {
    let err = TestError {
        message: "sensitive details",
        code: StatusCode::Internal,
    };
    assert_eq!(err.output_msg(), "Internal error: 1001");
}

#[test]
fn test_output_msg_shows_user_errors() {
    let err = TestError {
        message: "Task not found: task-9",
        code: StatusCode::TaskNotFound,
    };
    assert_eq!(err.output_msg(), "Task not found: task-9");
    assert!(!err.is_retryable());
}

#[test]
fn test_downcast() {
    let err = TestError {
        message: "timeout",
        code: StatusCode::Timeout,
    };
    let dyn_err: &dyn ErrorExt = &err;
    assert!(dyn_err.as_any().downcast_ref::<TestError>().is_some());
    assert!(dyn_err.is_retryable());
}
