//! Console configuration.
//!
//! Resolution order, later wins:
//! 1. built-in defaults
//! 2. JSON file (`$CONFIG_DIR/staffing-console/config.json`, or an explicit path)
//! 3. environment: `STAFFING_API_URL`, `STAFFING_API_KEY`,
//!    `STAFFING_TIMEOUT_SECS`, `STAFFING_STRICT_CAPACITY`

use std::fs;
use std::path::{Path, PathBuf};

use dirs::config_dir;
use serde::{Deserialize, Serialize};

use crate::capacity::CapacityPolicy;
use crate::client::{DEFAULT_TIMEOUT_SECS, DEFAULT_URL};
use crate::error::ConfigError;
use crate::query::{DEFAULT_BROAD_FETCH_SIZE, DEFAULT_PAGE_SIZE};

const APP_NAME: &str = "staffing-console";
const CONFIG_FILE: &str = "config.json";

pub const ENV_URL: &str = "STAFFING_API_URL";
pub const ENV_API_KEY: &str = "STAFFING_API_KEY";
pub const ENV_TIMEOUT: &str = "STAFFING_TIMEOUT_SECS";
pub const ENV_STRICT_CAPACITY: &str = "STAFFING_STRICT_CAPACITY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Base URL of the staffing API, without a trailing slash.
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    /// Rows per page for list views.
    pub page_size: u32,
    /// Rows fetched when a list has to be filtered locally.
    pub broad_fetch_size: u32,
    /// Reject allocations that push an employee over their maximum FTE
    /// instead of only warning.
    pub strict_capacity: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_URL.to_string(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            page_size: DEFAULT_PAGE_SIZE,
            broad_fetch_size: DEFAULT_BROAD_FETCH_SIZE,
            strict_capacity: false,
        }
    }
}

impl Config {
    /// Loads the file at `path` (or the default location) and applies
    /// environment overrides. A missing file at the default location is not
    /// an error; a missing explicit file is.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Applies overrides from `lookup`, normally the process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_URL).filter(|v| !v.is_empty()) {
            self.base_url = url;
        }
        if let Some(key) = lookup(ENV_API_KEY) {
            self.api_key = Some(key).filter(|k| !k.is_empty());
        }
        if let Some(value) = lookup(ENV_TIMEOUT) {
            self.timeout_secs = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                key: ENV_TIMEOUT,
                value,
            })?;
        }
        if let Some(value) = lookup(ENV_STRICT_CAPACITY) {
            self.strict_capacity = parse_flag(&value).ok_or(ConfigError::InvalidEnv {
                key: ENV_STRICT_CAPACITY,
                value,
            })?;
        }
        Ok(())
    }

    pub fn capacity_policy(&self) -> CapacityPolicy {
        if self.strict_capacity {
            CapacityPolicy::Strict
        } else {
            CapacityPolicy::Advisory
        }
    }
}

/// `$CONFIG_DIR/staffing-console/config.json`, when the platform has one.
pub fn default_path() -> Option<PathBuf> {
    let mut path = config_dir()?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Some(path)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
