//! Command completion markers.
//!
//! After each command the session prints a line `__TOOLRUN_<token>_<status>__`
//! with a fresh token. Seeing that line in the output means the command
//! finished; the digits are its exit status.

use std::sync::LazyLock;

use regex_lite::Regex;

static MARKER_LINE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^__TOOLRUN_[0-9a-f]+_\d+__$").ok());

pub(crate) fn new_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Shell input that prints the marker for `token` with the last exit status.
pub(crate) fn marker_command(token: &str) -> String {
    format!("printf '\\n__TOOLRUN_%s_%d__\\n' {token} $?\n")
}

/// A marker found in command output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MarkerMatch {
    /// Output before the marker, with line endings normalised.
    pub output: String,
    pub exit_code: i32,
}

/// Look for the marker of `token` in `text`.
pub(crate) fn find_marker(text: &str, token: &str) -> Option<MarkerMatch> {
    let pattern = format!("__TOOLRUN_{}_(\\d+)__", regex_lite::escape(token));
    let regex = Regex::new(&pattern).ok()?;
    let caps = regex.captures(text)?;
    let whole = caps.get(0)?;
    let exit_code = caps.get(1)?.as_str().parse::<i32>().unwrap_or(-1);

    let output = text[..whole.start()]
        .replace("\r\n", "\n")
        .trim_end_matches('\n')
        .to_string();
    Some(MarkerMatch { output, exit_code })
}

/// Remove marker lines, and the blank line printed before each, from
/// terminal output.
pub fn strip_markers(text: &str) -> String {
    let Some(regex) = MARKER_LINE.as_ref() else {
        return text.to_string();
    };

    let mut kept: Vec<&str> = Vec::new();
    for line in text.split_inclusive('\n') {
        let bare = line.trim_end_matches(['\r', '\n']);
        if regex.is_match(bare) {
            if kept
                .last()
                .is_some_and(|prev| prev.trim_end_matches(['\r', '\n']).is_empty())
            {
                kept.pop();
            }
            continue;
        }
        kept.push(line);
    }
    kept.concat()
}

#[cfg(test)]
#[path = "marker.test.rs"]
mod tests;
