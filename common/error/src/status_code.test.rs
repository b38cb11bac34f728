use super::*;
use strum::IntoEnumIterator;

#[test]
fn test_status_code_values() {
    assert_eq!(StatusCode::Success as i32, 00_000);
    assert_eq!(StatusCode::Unknown as i32, 01_000);
    assert_eq!(StatusCode::InvalidArguments as i32, 02_000);
    assert_eq!(StatusCode::IoError as i32, 03_000);

    assert_eq!(StatusCode::InvalidConfig as i32, 10_000);
    assert_eq!(StatusCode::ToolNotFound as i32, 11_000);
    assert_eq!(StatusCode::Timeout as i32, 12_003);
}

#[test]
fn test_is_success() {
    assert!(StatusCode::is_success(0));
    assert!(!StatusCode::is_success(01_000));
}

#[test]
fn test_retryable_rules() {
    assert!(StatusCode::Timeout.is_retryable());
    assert!(StatusCode::ResourcesExhausted.is_retryable());
    assert!(StatusCode::Internal.is_retryable());

    // A cancelled task was stopped on purpose.
    assert!(!StatusCode::Cancelled.is_retryable());
    assert!(!StatusCode::TaskNotFound.is_retryable());
    assert!(!StatusCode::NotPermittedByConfig.is_retryable());
    assert!(!StatusCode::ExecutionFailed.is_retryable());
}

#[test]
fn test_log_error_rules() {
    assert!(StatusCode::Unknown.should_log_error());
    assert!(StatusCode::Internal.should_log_error());
    assert!(StatusCode::ExecutionFailed.should_log_error());
    assert!(StatusCode::TerminalError.should_log_error());

    assert!(!StatusCode::InvalidArguments.should_log_error());
    assert!(!StatusCode::OutputNotFound.should_log_error());
    assert!(!StatusCode::Cancelled.should_log_error());
}

#[test]
fn test_display_and_name() {
    assert_eq!(format!("{}", StatusCode::Success), "Success");
    assert_eq!(StatusCode::SessionNotFound.name(), "SessionNotFound");
    assert_eq!(StatusCode::from_i32(11_002), Some(StatusCode::OutputNotFound));
    assert_eq!(StatusCode::from_i32(99_999), None);
}

#[test]
fn test_metadata_consistency() {
    for code in StatusCode::iter() {
        let meta = code.meta();
        let value = code as i32;

        // Verify category matches code range (XX_YYY format)
        match meta.category {
            StatusCategory::Success => assert_eq!(value, 0),
            StatusCategory::Common => assert!((01_000..02_000).contains(&value)),
            StatusCategory::Input => assert!((02_000..03_000).contains(&value)),
            StatusCategory::IO => assert!((03_000..04_000).contains(&value)),
            StatusCategory::Config => assert!((10_000..11_000).contains(&value)),
            StatusCategory::Execution => assert!((11_000..12_000).contains(&value)),
            StatusCategory::Resource => assert!((12_000..13_000).contains(&value)),
        }
    }
}
