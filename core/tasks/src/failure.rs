use serde_json::Value;
use toolrun_protocol::ToolOutput;
use toolrun_protocol::ToolResultContent;

/// Decide whether a settled result is a business failure.
///
/// Returns the failure message, or `None` when the result counts as a
/// success:
/// - `is_error` outputs fail with their text
/// - structured results with a non-empty string `error` fail with it
/// - structured results with `success: false` fail with `stderr`, or
///   `exit code N` when there is no stderr
///
/// Any other shape counts as success.
pub fn detect_failure(output: &ToolOutput) -> Option<String> {
    if output.is_error {
        let text = output.to_text();
        return Some(if text.trim().is_empty() {
            "tool reported an error".to_string()
        } else {
            text
        });
    }

    let ToolResultContent::Structured(Value::Object(map)) = &output.content else {
        return None;
    };

    if let Some(error) = non_empty_str(map.get("error")) {
        return Some(error.to_string());
    }

    if map.get("success") == Some(&Value::Bool(false)) {
        if let Some(stderr) = non_empty_str(map.get("stderr")) {
            return Some(stderr.to_string());
        }
        return Some(match map.get("exit_code").and_then(Value::as_i64) {
            Some(code) => format!("exit code {code}"),
            None => "command failed".to_string(),
        });
    }

    None
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
#[path = "failure.test.rs"]
mod tests;
