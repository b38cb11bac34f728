//! Small utilities shared across the toolrun crates.

mod elapsed;
mod logging;

pub use elapsed::format_duration;
pub use elapsed::format_elapsed_ms;
pub use logging::ConfigurableTimer;
pub use logging::LoggingConfig;
pub use logging::TimezoneConfig;
pub use logging::build_env_filter;
pub use logging::init_logging;
