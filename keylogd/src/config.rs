//! # keylogd configuration
//!
//! The only setting is the CSV log path. It is resolved from, in order of
//! precedence:
//!
//! 1. the `--log-file` flag
//! 2. the `KEYLOGD_LOG_FILE` environment variable
//! 3. `log_file` in a TOML config file (`--config`, then `KEYLOGD_CONFIG`,
//!    then `keylogd.toml` in the working directory)
//! 4. `key_press_log.csv` in the working directory
//!
//! A config file named explicitly must load; an auto-discovered one that
//! fails to parse is skipped with a warning.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::{KeylogError, KeylogResult};

pub const DEFAULT_LOG_FILE: &str = "key_press_log.csv";
pub const CONFIG_FILE_NAME: &str = "keylogd.toml";
pub const ENV_LOG_FILE: &str = "KEYLOGD_LOG_FILE";
pub const ENV_CONFIG: &str = "KEYLOGD_CONFIG";

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    pub log_file: PathBuf,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

/// On-disk config file layout.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    log_file: Option<PathBuf>,
}

/// Raw inputs to configuration resolution, gathered up front so that
/// resolution itself never touches the process environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    pub cli_log_file: Option<PathBuf>,
    pub cli_config: Option<PathBuf>,
    pub env_log_file: Option<String>,
    pub env_config: Option<String>,
    pub working_dir: Option<PathBuf>,
}

impl ConfigSources {
    /// Combine CLI values with the current environment.
    pub fn from_env(cli_log_file: Option<PathBuf>, cli_config: Option<PathBuf>) -> Self {
        Self {
            cli_log_file,
            cli_config,
            env_log_file: env::var(ENV_LOG_FILE).ok(),
            env_config: env::var(ENV_CONFIG).ok(),
            working_dir: env::current_dir().ok(),
        }
    }
}

impl SinkConfig {
    pub fn resolve(sources: &ConfigSources) -> KeylogResult<Self> {
        if let Some(path) = &sources.cli_log_file {
            debug!("Log file from --log-file: {}", path.display());
            return Ok(Self {
                log_file: path.clone(),
            });
        }

        if let Some(value) = non_blank(sources.env_log_file.as_deref()) {
            debug!("Log file from {}: {}", ENV_LOG_FILE, value);
            return Ok(Self {
                log_file: PathBuf::from(value),
            });
        }

        let explicit = sources
            .cli_config
            .clone()
            .or_else(|| non_blank(sources.env_config.as_deref()).map(PathBuf::from));

        let file = match explicit {
            Some(path) => Some(load_file(&path)?),
            None => discover(sources.working_dir.as_deref()),
        };

        let config = file
            .and_then(|f| f.log_file)
            .map(|log_file| Self { log_file })
            .unwrap_or_default();
        debug!("Log file: {}", config.log_file.display());
        Ok(config)
    }
}

fn discover(working_dir: Option<&Path>) -> Option<ConfigFile> {
    let candidate = working_dir?.join(CONFIG_FILE_NAME);
    if !candidate.is_file() {
        return None;
    }
    match load_file(&candidate) {
        Ok(file) => Some(file),
        Err(err) => {
            warn!("Ignoring {}: {}", candidate.display(), err);
            None
        }
    }
}

fn load_file(path: &Path) -> KeylogResult<ConfigFile> {
    let contents = fs::read_to_string(path).map_err(|e| KeylogError::Config {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    toml::from_str(&contents).map_err(|e| KeylogError::Config {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
