//! Wiring from configuration files to a running IPC server.

use crate::error::HostError;

use translate_core::config::{Preferences, TranslatorConfig};
use translate_core::gemini::GeminiClient;
use translate_core::ipc::{
    HostState, IpcServerConfig, IpcServerHandle, PreferenceStore, start_ipc_server,
};
use translate_core::pipeline::TranslationPipeline;
use translate_core::session::SessionRegistry;

use std::path::Path;

use log::{info, warn};

/// Env var that pins the IPC auth token (otherwise a fresh one per run).
pub const TOKEN_ENV: &str = "TRANSLATE_HOST_TOKEN";

/// Token from [`TOKEN_ENV`] if set and non-blank.
///
/// `None` lets the router generate one; only a generated token is logged.
pub fn resolve_auth_token() -> Option<String> {
    match std::env::var(TOKEN_ENV) {
        Ok(token) if !token.trim().is_empty() => {
            info!("Using IPC auth token from {TOKEN_ENV}");
            Some(token.trim().to_string())
        }
        _ => None,
    }
}

/// Load config and preferences from `config_dir` and start the router.
///
/// `port_override` replaces the configured port (tests pass 0).
///
/// # Errors
///
/// Returns [`HostError::Core`] if the config is invalid, the base URL cannot
/// be used, or the port cannot be bound.
pub async fn start_host(
    config_dir: &Path,
    auth_token: Option<String>,
    port_override: Option<u16>,
) -> Result<IpcServerHandle, HostError> {
    let config = TranslatorConfig::load(config_dir)?;

    let preferences = match Preferences::load(config_dir) {
        Ok(preferences) => preferences,
        Err(e) => {
            warn!("Ignoring unreadable preferences, starting empty: {e}");
            Preferences::default()
        }
    };

    let client = GeminiClient::new(config.api.base_url.trim())?;
    let models = config.model_list()?;
    info!("Model chain: {}", models.ids().join(" -> "));

    let pipeline = TranslationPipeline::new(client, models, config.pipeline_settings());
    let sessions = SessionRegistry::new(config.ipc.debounce_window());
    let store = PreferenceStore::new(config_dir.to_path_buf(), preferences);
    let state = HostState::new(pipeline, sessions, store);

    let port = port_override.unwrap_or(config.ipc.port);
    let ipc_config = IpcServerConfig {
        port,
        auth_token,
    };
    let handle = start_ipc_server(ipc_config, state).await?;

    Ok(handle)
}
