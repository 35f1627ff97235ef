//! API key resolution: stored preference first, then the environment.

use super::preferences::Preferences;

use common::Credential;

use std::env;
use std::path::PathBuf;

use log::{debug, info, warn};

pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Result of looking for a `.env` file.
#[derive(Debug, Clone)]
pub struct EnvLoadResult {
    pub path: Option<PathBuf>,
    pub loaded: bool,
}

/// Load `.env` from the working directory, then from next to the executable.
///
/// Existing environment variables are never overridden.
pub fn try_load_dotenv() -> EnvLoadResult {
    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded .env from: {:?}", path);
        return EnvLoadResult {
            path: Some(path),
            loaded: true,
        };
    }

    if let Ok(exe_path) = env::current_exe()
        && let Some(exe_dir) = exe_path.parent()
    {
        let env_path = exe_dir.join(".env");
        if env_path.exists() {
            match dotenvy::from_path(&env_path) {
                Ok(()) => {
                    info!("Loaded .env from: {:?}", env_path);
                    return EnvLoadResult {
                        path: Some(env_path),
                        loaded: true,
                    };
                }
                Err(e) => warn!("Failed to parse .env at {:?}: {}", env_path, e),
            }
        }
    }

    debug!("No .env file found - will check existing environment variables");
    EnvLoadResult {
        path: None,
        loaded: false,
    }
}

/// The credential to translate with.
///
/// Returns an empty [`Credential`] when neither the preferences nor
/// `GEMINI_API_KEY` carry a key; the pipeline rejects it before any request.
pub fn resolve_credential(preferences: &Preferences) -> Credential {
    if let Some(credential) = preferences.credential() {
        return credential;
    }

    match Credential::from_optional(env::var(GEMINI_API_KEY_ENV).ok()) {
        Some(credential) => {
            debug!(
                "Using API key from {} ({} chars)",
                GEMINI_API_KEY_ENV,
                credential.len()
            );
            credential
        }
        None => Credential::default(),
    }
}
