//! Scan defaults loaded from a JSON settings file.
//!
//! The file lives in the XDG config directory (`~/.config/portsweep` on
//! Linux) unless a path is given explicitly. Every field is optional.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the settings file inside the config directory.
const SETTINGS_FILE: &str = "settings.json";

/// Default location of the settings file, if a config directory exists.
pub fn default_settings_path() -> ConfigResult<PathBuf> {
    let project =
        ProjectDirs::from("", "", "portsweep").ok_or(ConfigError::DirectoryNotFound)?;
    Ok(project.config_dir().join(SETTINGS_FILE))
}

/// Scan defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Port expression, e.g. "1-1024".
    pub ports: String,
    /// Per-connection timeout in seconds.
    pub timeout_secs: f64,
    /// Maximum concurrent probes.
    pub concurrency: usize,
    /// Capture banners from open ports.
    pub grab_banners: bool,
    /// Optional limit for the whole scan, in seconds.
    pub deadline_secs: Option<f64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ports: "1-1024".to_string(),
            timeout_secs: 1.0,
            concurrency: 200,
            grab_banners: false,
            deadline_secs: None,
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from the default location.
    ///
    /// A missing default file yields the built-in defaults; a missing
    /// explicit file is an error.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let path = match default_settings_path() {
                    Ok(path) => path,
                    Err(e) => {
                        debug!("{}, using built-in defaults", e);
                        return Ok(Self::default());
                    }
                };
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        debug!("loaded settings from {}", path.display());
        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }
}
