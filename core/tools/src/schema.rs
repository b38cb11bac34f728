//! Execution options accepted on top of every wrapped tool's own arguments.

use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use toolrun_protocol::ToolCallConfig;

pub const TIMEOUT_KEY: &str = "timeout";
pub const BACKGROUND_KEY: &str = "background";
/// Accepted spellings of the timeout, after [`TIMEOUT_KEY`].
const TIMEOUT_ALIASES: [&str; 2] = ["timeoutMs", "timeout_ms"];

/// Options stripped from a call's input before the tool sees it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionOptions {
    /// Requested deadline in milliseconds.
    pub timeout_ms: Option<i64>,
    pub background: bool,
}

impl ExecutionOptions {
    /// Separate execution options from the business arguments.
    ///
    /// `timeout` wins over its aliases when several are given. Values that
    /// are not finite numbers are dropped. Non-object inputs pass through.
    pub fn split(input: Value) -> (Self, Value) {
        let Value::Object(mut args) = input else {
            return (Self::default(), input);
        };

        let primary = args.remove(TIMEOUT_KEY).and_then(|v| parse_ms(&v));
        let mut timeout_ms = primary;
        for alias in TIMEOUT_ALIASES {
            let value = args.remove(alias).and_then(|v| parse_ms(&v));
            if timeout_ms.is_none() {
                timeout_ms = value;
            }
        }
        let background = args
            .remove(BACKGROUND_KEY)
            .is_some_and(|v| parse_flag(&v));

        (
            Self {
                timeout_ms,
                background,
            },
            Value::Object(args),
        )
    }
}

fn parse_ms(value: &Value) -> Option<i64> {
    let ms = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    ms.is_finite().then_some(ms as i64)
}

fn parse_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Rebuild `base` with the execution options `config` lets callers use.
///
/// `base` is left untouched. Properties already named `timeout` or
/// `background` are replaced.
pub fn augment_schema(base: &Value, config: &ToolCallConfig) -> Value {
    let mut schema = match base {
        Value::Object(map) => map.clone(),
        _ => {
            let mut map = Map::new();
            map.insert("type".to_string(), json!("object"));
            map
        }
    };

    let mut properties = match schema.remove("properties") {
        Some(Value::Object(props)) => props,
        _ => Map::new(),
    };
    if config.allow_agent_set_duration {
        properties.insert(
            TIMEOUT_KEY.to_string(),
            json!({
                "type": "number",
                "description": format!(
                    "Maximum execution time in milliseconds (at most {}).",
                    config.max_duration_ms.max(0)
                ),
            }),
        );
    }
    if config.allow_background {
        properties.insert(
            BACKGROUND_KEY.to_string(),
            json!({
                "type": "boolean",
                "description": "Run in the background and return a task id immediately. \
                                Use get_task to follow up.",
            }),
        );
    }
    schema.insert("properties".to_string(), Value::Object(properties));
    Value::Object(schema)
}

#[cfg(test)]
#[path = "schema.test.rs"]
mod tests;
