//! Platform directories used by the host.

use crate::error::HostError;

use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

/// Directory name under the platform config and data dirs.
pub const APP_DIR_NAME: &str = "gemini-translate";

const LOGS_DIR_NAME: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPaths {
    /// Holds `translator.toml` and `preferences.json`.
    pub config_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl HostPaths {
    /// `{config_dir}/gemini-translate` and `{data_local_dir}/gemini-translate/logs`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Host`] if the platform has no such directories.
    pub fn resolve() -> Result<Self, HostError> {
        let config_root = dirs::config_dir()
            .ok_or_else(|| HostError::host("No platform config directory"))?;
        let data_root = dirs::data_local_dir()
            .ok_or_else(|| HostError::host("No platform data directory"))?;

        Ok(Self::under(&config_root, &data_root))
    }

    pub fn under(config_root: &Path, data_root: &Path) -> Self {
        Self {
            config_dir: config_root.join(APP_DIR_NAME),
            log_dir: data_root.join(APP_DIR_NAME).join(LOGS_DIR_NAME),
        }
    }

    /// Create both directories if missing.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Host`] naming the directory that could not be created.
    pub fn ensure_exist(&self) -> Result<(), HostError> {
        for dir in [&self.config_dir, &self.log_dir] {
            create_dir_all(dir).map_err(|e| {
                HostError::host(format!("Failed to create {}: {e}", dir.display()))
            })?;
        }
        Ok(())
    }
}
