//! Configuration loading.
//!
//! Reads `~/.idler/config.toml` (or the path in `IDLER_CONFIG`). A missing file
//! yields defaults; a malformed one is an error so typos do not silently fall
//! back to localhost.

use crate::error::{IdlerError, Result};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV: &str = "IDLER_CONFIG";
pub const BASE_URL_ENV: &str = "IDLER_BASE_URL";
const DATA_DIR_NAME: &str = ".idler";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdlerConfig {
    /// Backend root, e.g. `http://127.0.0.1:5000`.
    pub base_url: String,
    pub poll_interval_secs: u64,
    pub timer_interval_ms: u64,
    /// Pause between sequential stops in stop-all; 0 disables it.
    pub stop_all_delay_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for IdlerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            poll_interval_secs: 2,
            timer_interval_ms: 1000,
            stop_all_delay_ms: 1000,
            request_timeout_secs: 30,
        }
    }
}

impl IdlerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn timer_interval(&self) -> Duration {
        Duration::from_millis(self.timer_interval_ms.max(1))
    }

    pub fn stop_all_delay(&self) -> Duration {
        Duration::from_millis(self.stop_all_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    fn apply_env_overrides(mut self) -> Self {
        if let Ok(base_url) = env::var(BASE_URL_ENV) {
            let trimmed = base_url.trim();
            if !trimmed.is_empty() {
                self.base_url = trimmed.to_string();
            }
        }
        self
    }
}

/// Returns `~/.idler`, where the config and logs live.
pub fn data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DATA_DIR_NAME))
}

/// Returns the config path, honouring `IDLER_CONFIG`.
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var(CONFIG_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    data_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Loads the config from `path` (or the default location), then applies
/// environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<IdlerConfig> {
    let config_path = match path {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path(),
    };

    let config = match config_path {
        Some(path) => read_config_file(&path)?,
        None => IdlerConfig::default(),
    };
    Ok(config.apply_env_overrides())
}

fn read_config_file(path: &Path) -> Result<IdlerConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No config file; using defaults");
        return Ok(IdlerConfig::default());
    }

    let content = fs_err::read_to_string(path).map_err(|source| IdlerError::Io {
        context: format!("Failed to read config {}", path.display()),
        source,
    })?;
    toml::from_str::<IdlerConfig>(&content).map_err(|err| IdlerError::ConfigMalformed {
        path: path.to_path_buf(),
        details: err.to_string(),
    })
}
