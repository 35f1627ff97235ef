//! User preferences persisted between runs.
//!
//! Field names on disk match the keys the extension UI stores
//! (`apiKey`, `targetLang`, `lastInput`, `lastResult`, `lastTargetLang`).

use crate::error::config::ConfigError;

use common::Credential;

use std::fmt;
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

pub const PREFERENCES_FILE_NAME: &str = "preferences.json";

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_target_lang: Option<String>,
}

impl fmt::Debug for Preferences {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Preferences")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("target_lang", &self.target_lang)
            .field("last_input", &self.last_input)
            .field("last_result", &self.last_result)
            .field("last_target_lang", &self.last_target_lang)
            .finish()
    }
}

/// Partial update. `None` leaves a field untouched; an empty `api_key` removes the key.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PreferenceUpdate {
    pub api_key: Option<String>,
    pub target_lang: Option<String>,
    pub last_input: Option<String>,
    pub last_result: Option<String>,
    pub last_target_lang: Option<String>,
}

impl fmt::Debug for PreferenceUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferenceUpdate")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("target_lang", &self.target_lang)
            .field("last_input", &self.last_input)
            .field("last_result", &self.last_result)
            .field("last_target_lang", &self.last_target_lang)
            .finish()
    }
}

impl PreferenceUpdate {
    /// Update recording a successful popup translation.
    pub fn last_translation(result: impl Into<String>, target_lang: impl Into<String>) -> Self {
        Self {
            last_result: Some(result.into()),
            last_target_lang: Some(target_lang.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl Preferences {
    /// The stored API key, if one is set and not blank.
    pub fn credential(&self) -> Option<Credential> {
        Credential::from_optional(self.api_key.clone())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }

    pub fn apply(&mut self, update: PreferenceUpdate) {
        if let Some(api_key) = update.api_key {
            let api_key = api_key.trim();
            self.api_key = (!api_key.is_empty()).then(|| api_key.to_string());
        }
        if let Some(target_lang) = update.target_lang {
            self.target_lang = Some(target_lang);
        }
        if let Some(last_input) = update.last_input {
            self.last_input = Some(last_input);
        }
        if let Some(last_result) = update.last_result {
            self.last_result = Some(last_result);
        }
        if let Some(last_target_lang) = update.last_target_lang {
            self.last_target_lang = Some(last_target_lang);
        }
    }

    /// Load `{config_dir}/preferences.json`.
    ///
    /// # Returns
    ///
    /// Returns empty preferences if the file is missing.
    /// Returns `Err(ConfigError)` if the file exists but cannot be read or parsed.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(PREFERENCES_FILE_NAME);

        if !path.exists() {
            debug!("No preferences at {}, starting empty", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::read(&path, e))?;
        let preferences: Preferences =
            serde_json::from_str(&contents).map_err(|e| ConfigError::parse(&path, e.to_string()))?;

        info!("Preferences loaded from {}", path.display());
        Ok(preferences)
    }

    /// Save to `{config_dir}/preferences.json` using temp file + rename.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if directory creation, serialization, the write
    /// or the rename fails.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::write(config_dir, e))?;

        let path = config_dir.join(PREFERENCES_FILE_NAME);
        let temp_path = config_dir.join(format!("{PREFERENCES_FILE_NAME}.tmp"));

        let json =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::serialize(e.to_string()))?;

        std::fs::write(&temp_path, json).map_err(|e| ConfigError::write(&temp_path, e))?;
        std::fs::rename(&temp_path, &path).map_err(|e| ConfigError::write(&path, e))?;

        debug!("Preferences saved to {}", path.display());
        Ok(())
    }
}
