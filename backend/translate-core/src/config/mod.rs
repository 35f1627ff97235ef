pub mod credential;
pub mod preferences;

pub use credential::{GEMINI_API_KEY_ENV, resolve_credential, try_load_dotenv};
pub use preferences::{PreferenceUpdate, Preferences};

use crate::GEMINI_API_BASE_URL;
use crate::DEFAULT_IPC_PORT;
use crate::error::config::ConfigError;
use crate::model_list::{DEFAULT_MODEL_IDS, ModelList, ModelSpec};
use crate::pipeline::{PipelineSettings, QuotaPolicy};

use std::path::Path;
use std::time::Duration;

use log::info;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = "translator.toml";

const MIN_ATTEMPT_TIMEOUT_SECS: u64 = 1;
const MAX_ATTEMPT_TIMEOUT_SECS: u64 = 120;

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_attempt_timeout_secs")]
    pub attempt_timeout_secs: u64,
    #[serde(default)]
    pub quota_policy: QuotaPolicy,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            attempt_timeout_secs: default_attempt_timeout_secs(),
            quota_policy: QuotaPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpcSection {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for IpcSection {
    fn default() -> Self {
        Self {
            port: default_port(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl IpcSection {
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl ModelEntry {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            max_output_tokens: None,
        }
    }

    fn to_spec(&self) -> ModelSpec {
        let spec = ModelSpec::new(self.id.trim());
        match self.max_output_tokens {
            Some(max_output_tokens) => spec.with_max_output_tokens(max_output_tokens),
            None => spec,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatorConfig {
    #[serde(default)]
    pub api: ApiSection,

    #[serde(default)]
    pub ipc: IpcSection,

    #[serde(default = "default_models")]
    pub models: Vec<ModelEntry>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api: ApiSection::default(),
            ipc: IpcSection::default(),
            models: default_models(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_base_url() -> String {
    GEMINI_API_BASE_URL.to_string()
}
fn default_attempt_timeout_secs() -> u64 {
    8
}
fn default_port() -> u16 {
    DEFAULT_IPC_PORT
}
fn default_debounce_ms() -> u64 {
    1000
}
fn default_models() -> Vec<ModelEntry> {
    DEFAULT_MODEL_IDS.iter().map(|id| ModelEntry::new(*id)).collect()
}

// ============================================
// IMPLEMENTATION
// ============================================

impl TranslatorConfig {
    /// Load `{config_dir}/translator.toml`.
    ///
    /// # Returns
    ///
    /// Returns defaults if the file is missing.
    /// Returns `Err(ConfigError)` if the file exists but is unreadable, malformed or invalid.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).map_err(|e| ConfigError::read(&config_path, e))?;

        let config = Self::from_toml_str(&contents)
            .map_err(|e| ConfigError::parse(&config_path, e.to_string()))?;

        config.validate()?;

        info!(
            "Config loaded from {} ({} model(s))",
            config_path.display(),
            config.models.len()
        );
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.api.base_url.trim();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::validation(format!(
                "Invalid base_url format: {}",
                self.api.base_url
            )));
        }

        if !(MIN_ATTEMPT_TIMEOUT_SECS..=MAX_ATTEMPT_TIMEOUT_SECS)
            .contains(&self.api.attempt_timeout_secs)
        {
            return Err(ConfigError::validation(format!(
                "Invalid attempt_timeout_secs: {} (must be {MIN_ATTEMPT_TIMEOUT_SECS}-{MAX_ATTEMPT_TIMEOUT_SECS})",
                self.api.attempt_timeout_secs
            )));
        }

        self.model_list()?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if the `[[models]]` entries do not
    /// form a valid fallback list.
    pub fn model_list(&self) -> Result<ModelList, ConfigError> {
        ModelList::new(self.models.iter().map(ModelEntry::to_spec).collect())
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            attempt_timeout: Duration::from_secs(self.api.attempt_timeout_secs),
            quota_policy: self.api.quota_policy,
        }
    }
}
