//! Tracing subscriber setup.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

/// Timezone used for log timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimezoneConfig {
    #[default]
    Local,
    Utc,
}

/// Resolved logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Include source file and line in each event.
    #[serde(default)]
    pub location: bool,
    /// Include the event target (module path).
    #[serde(default)]
    pub target: bool,
    #[serde(default)]
    pub timezone: TimezoneConfig,
    /// Base level directive, e.g. `"info"`.
    #[serde(default = "default_level")]
    pub level: String,
    /// Extra per-module directives, e.g. `"toolrun_terminal=trace"`.
    #[serde(default)]
    pub modules: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            location: false,
            target: false,
            timezone: TimezoneConfig::Local,
            level: default_level(),
            modules: Vec::new(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

/// A timer that formats timestamps in either local time or UTC.
#[derive(Debug, Clone)]
pub struct ConfigurableTimer {
    timezone: TimezoneConfig,
}

impl ConfigurableTimer {
    pub fn new(timezone: TimezoneConfig) -> Self {
        Self { timezone }
    }
}

impl FormatTime for ConfigurableTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        match self.timezone {
            TimezoneConfig::Local => {
                let now = chrono::Local::now();
                write!(w, "{}", now.format("%Y-%m-%d %H:%M:%S%.3f"))
            }
            TimezoneConfig::Utc => {
                let now = chrono::Utc::now();
                write!(w, "{}", now.format("%Y-%m-%d %H:%M:%S%.3fZ"))
            }
        }
    }
}

/// Build the filter from `RUST_LOG` if set, otherwise from the config.
///
/// `default_level` is used when the configured level is empty or the
/// directives fail to parse.
pub fn build_env_filter(logging: &LoggingConfig, default_level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let base = if logging.level.trim().is_empty() {
        default_level
    } else {
        logging.level.trim()
    };
    let directives = std::iter::once(base)
        .chain(logging.modules.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(",");

    EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Install a global fmt subscriber writing to stderr.
///
/// Fails if a global subscriber is already set.
pub fn init_logging(
    logging: &LoggingConfig,
    default_level: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    tracing_subscriber::fmt()
        .with_env_filter(build_env_filter(logging, default_level))
        .with_timer(ConfigurableTimer::new(logging.timezone))
        .with_file(logging.location)
        .with_line_number(logging.location)
        .with_target(logging.target)
        .with_writer(std::io::stderr)
        .try_init()
}

#[cfg(test)]
#[path = "logging.test.rs"]
mod tests;
