use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_marker_command_shape() {
    assert_eq!(
        marker_command("abc123"),
        "printf '\\n__TOOLRUN_%s_%d__\\n' abc123 $?\n"
    );
}

#[test]
fn test_find_marker_extracts_output_and_status() {
    let text = "hello\r\nworld\r\n\r\n__TOOLRUN_abc_42__\r\n";
    let found = find_marker(text, "abc").unwrap();
    assert_eq!(
        found,
        MarkerMatch {
            output: "hello\nworld".to_string(),
            exit_code: 42,
        }
    );
}

#[test]
fn test_find_marker_ignores_other_tokens() {
    let text = "x\n__TOOLRUN_old_0__\n";
    assert_eq!(find_marker(text, "new"), None);
}

#[test]
fn test_find_marker_ignores_command_echo() {
    let text = "printf '\\n__TOOLRUN_%s_%d__\\n' tok $?\n";
    assert_eq!(find_marker(text, "tok"), None);
}

#[test]
fn test_strip_markers() {
    let text = "A\n\n__TOOLRUN_0a1b_0__\nB\n\n__TOOLRUN_ff_1__\n";
    assert_eq!(strip_markers(text), "A\nB\n");
}

#[test]
fn test_strip_markers_keeps_normal_text() {
    let text = "__TOOLRUN_ is mentioned here\nplain\n";
    assert_eq!(strip_markers(text), text);
}

#[test]
fn test_new_token_is_hex() {
    let token = new_token();
    assert_eq!(token.len(), 32);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
}
