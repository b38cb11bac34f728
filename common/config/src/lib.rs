//! Configuration loading for the toolrun runtime.
//!
//! Settings come from three layers, later ones winning:
//! 1. Built-in defaults
//! 2. A JSON file (`~/.toolrun/config.json` by default)
//! 3. `TOOLRUN_*` environment variables

pub mod env_loader;
pub mod error;
pub mod loader;
mod runtime_config;

pub use env_loader::EnvLoader;
pub use error::ConfigError;
pub use error::Result;
pub use loader::ConfigLoader;
pub use runtime_config::RuntimeConfig;
