use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_format_duration_ranges() {
    assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
    assert_eq!(format_duration(Duration::from_millis(1_500)), "1.50s");
    assert_eq!(format_duration(Duration::from_millis(75_000)), "1m 15s");
}

#[test]
fn test_negative_is_zero() {
    assert_eq!(format_elapsed_ms(-20), "0ms");
}
