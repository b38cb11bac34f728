//! Tool result types.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// Content of a tool result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolResultContent {
    /// Text content.
    Text(String),
    /// Structured content (JSON).
    Structured(Value),
}

impl Default for ToolResultContent {
    fn default() -> Self {
        ToolResultContent::Text(String::new())
    }
}

impl ToolResultContent {
    /// Serialize the content to the text a caller would receive.
    ///
    /// Text passes through. Structured values are rendered as compact JSON;
    /// object keys come out sorted, so the rendering is stable.
    pub fn to_text(&self) -> String {
        match self {
            ToolResultContent::Text(text) => text.clone(),
            ToolResultContent::Structured(value) => value.to_string(),
        }
    }

    /// Returns the structured value, if any.
    pub fn as_structured(&self) -> Option<&Value> {
        match self {
            ToolResultContent::Structured(value) => Some(value),
            ToolResultContent::Text(_) => None,
        }
    }
}

/// Output from a tool execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// The content of the output.
    pub content: ToolResultContent,
    /// Whether this output represents an error.
    #[serde(default)]
    pub is_error: bool,
}

impl ToolOutput {
    /// Create a successful text output.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: ToolResultContent::Text(content.into()),
            is_error: false,
        }
    }

    /// Create an error output.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: ToolResultContent::Text(message.into()),
            is_error: true,
        }
    }

    /// Create a structured output.
    pub fn structured(value: Value) -> Self {
        Self {
            content: ToolResultContent::Structured(value),
            is_error: false,
        }
    }

    /// Serialize the content. See [`ToolResultContent::to_text`].
    pub fn to_text(&self) -> String {
        self.content.to_text()
    }
}

#[cfg(test)]
#[path = "tool_types.test.rs"]
mod tests;
