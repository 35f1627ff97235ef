use translate_host::error::HostError;
use translate_host::logger::initialize as LoggerInitialize;
use translate_host::paths::HostPaths;
use translate_host::startup::{resolve_auth_token, start_host};

use translate_core::config::try_load_dotenv;

use log::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{e}");
        eprintln!("{e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), HostError> {
    let paths = HostPaths::resolve()?;
    paths.ensure_exist()?;

    // Initialize logger FIRST
    LoggerInitialize(&paths.log_dir)?;

    info!("Gemini translate host starting");
    info!("Config directory: {}", paths.config_dir.display());
    info!("Log directory: {}", paths.log_dir.display());

    try_load_dotenv();

    let auth_token = resolve_auth_token();
    let handle = start_host(&paths.config_dir, auth_token, None).await?;

    info!("IPC server listening on ws://{}", handle.local_addr());

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| HostError::host(format!("Failed to listen for Ctrl-C: {e}")))?;

    info!("Shutting down");
    handle.shutdown();
    Ok(())
}
