use serde_json::json;
use toolrun_protocol::ToolOutput;
use toolrun_protocol::ToolResultContent;
use tracing::debug;

use crate::OutputMeta;
use crate::OutputStore;

/// Divert a result longer than `budget_chars` into `store`.
///
/// The result is serialized first: text as-is, structured values as compact
/// JSON with sorted keys. Results within budget come back unchanged.
/// Otherwise the full text is stored and the caller gets a structured
/// payload with the output id, total length, the first `budget_chars`
/// characters and a pointer to `read_output`.
pub async fn truncate_if_needed(
    output: ToolOutput,
    tool_name: &str,
    call_id: &str,
    budget_chars: usize,
    store: &OutputStore,
) -> ToolOutput {
    let text = output.to_text();
    let total_length = text.chars().count();
    if total_length <= budget_chars {
        return output;
    }

    let prefix: String = text.chars().take(budget_chars).collect();
    let output_id = store
        .store(
            text,
            OutputMeta {
                tool_name: tool_name.to_string(),
                call_id: call_id.to_string(),
            },
        )
        .await;
    debug!(tool = tool_name, %output_id, total_length, budget_chars, "Truncated tool output");

    let message = format!(
        "Output truncated: showing {budget_chars} of {total_length} characters. \
         Call read_output with output_id \"{output_id}\" and offset {budget_chars} to read the rest."
    );
    ToolOutput {
        content: ToolResultContent::Structured(json!({
            "output_id": output_id,
            "truncated": true,
            "total_length": total_length,
            "content": prefix,
            "message": message,
        })),
        is_error: output.is_error,
    }
}

#[cfg(test)]
#[path = "truncation.test.rs"]
mod tests;
