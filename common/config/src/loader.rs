//! Configuration file loading.

use std::path::Path;
use std::path::PathBuf;

use tracing::debug;

use crate::EnvLoader;
use crate::RuntimeConfig;
use crate::error::ConfigError;
use crate::error::Result;

/// Default configuration directory under the home directory.
pub const DEFAULT_CONFIG_DIR: &str = ".toolrun";

/// Configuration file name.
pub const CONFIG_FILE: &str = "config.json";

/// Overrides the configuration directory.
pub const TOOLRUN_HOME_ENV: &str = "TOOLRUN_HOME";

/// `~/.toolrun`, or `./.toolrun` when there is no home directory.
pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_CONFIG_DIR)
}

/// `$TOOLRUN_HOME` if set, otherwise [`default_config_dir`].
pub fn find_toolrun_home() -> PathBuf {
    match std::env::var(TOOLRUN_HOME_ENV) {
        Ok(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => default_config_dir(),
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    /// Loader for [`find_toolrun_home`].
    pub fn new() -> Self {
        Self {
            config_dir: find_toolrun_home(),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self {
            config_dir: path.as_ref().to_path_buf(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// Parse one JSON config file. Missing fields take their defaults.
    pub fn load_from_file(path: &Path) -> Result<RuntimeConfig> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let config: RuntimeConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::InvalidJson {
                file: path.display().to_string(),
                error: e.to_string(),
            })?;
        debug!(path = %path.display(), tools = config.tools.len(), "Loaded config file");
        Ok(config)
    }

    /// Defaults, then the config file if present, then environment
    /// overrides. The result is validated.
    pub fn load(&self) -> Result<RuntimeConfig> {
        self.load_with_env(&EnvLoader::new())
    }

    pub fn load_with_env(&self, env: &EnvLoader) -> Result<RuntimeConfig> {
        let path = self.config_file();
        let mut config = if path.exists() {
            Self::load_from_file(&path)?
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            RuntimeConfig::default()
        };
        env.apply(&mut config);
        config.validate()?;
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "loader.test.rs"]
mod tests;
