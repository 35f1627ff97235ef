//! Preference persistence using the actor pattern.
//!
//! - mutations go through an mpsc channel and are applied one at a time by a
//!   dedicated task, which also writes them to disk
//! - reads clone from an `Arc<RwLock<Preferences>>` and never wait on disk I/O
//!
//! `update` resolves once the change is visible to readers, so a
//! `savePreferences` followed by a translation always sees the new key.

use crate::config::{PreferenceUpdate, Preferences, resolve_credential};
use crate::error::ipc::IpcError;

use common::{Credential, ErrorLocation};

use std::panic::Location;
use std::path::PathBuf;
use std::sync::Arc;

use log::{error, info, warn};
use tokio::sync::{Mutex, RwLock, mpsc, oneshot};

#[derive(Debug)]
pub enum PreferenceCommand {
    /// Apply a partial update, then persist.
    Apply {
        update: PreferenceUpdate,
        applied: oneshot::Sender<()>,
    },
}

/// Shared handle to the preference store. Clones share the same state.
#[derive(Clone)]
pub struct PreferenceStore {
    command_tx: Arc<Mutex<Option<mpsc::Sender<PreferenceCommand>>>>,
    preferences: Arc<RwLock<Preferences>>,
    /// `None` keeps changes in memory only.
    config_dir: Arc<Option<PathBuf>>,
}

impl PreferenceStore {
    /// Store backed by `{config_dir}/preferences.json`.
    pub fn new(config_dir: PathBuf, preferences: Preferences) -> Self {
        Self::build(Some(config_dir), preferences)
    }

    /// Store that never touches disk.
    pub fn in_memory(preferences: Preferences) -> Self {
        Self::build(None, preferences)
    }

    fn build(config_dir: Option<PathBuf>, preferences: Preferences) -> Self {
        Self {
            command_tx: Arc::new(Mutex::new(None)),
            preferences: Arc::new(RwLock::new(preferences)),
            config_dir: Arc::new(config_dir),
        }
    }

    /// Apply `update` and wait until readers can see it.
    ///
    /// Spawns the actor on first call.
    ///
    /// # Errors
    ///
    /// Returns [`IpcError::State`] if the actor has stopped.
    pub async fn update(&self, update: PreferenceUpdate) -> Result<(), IpcError> {
        let (applied_tx, applied_rx) = oneshot::channel();

        {
            let mut tx_guard = self.command_tx.lock().await;
            let tx = tx_guard.get_or_insert_with(|| self.spawn_actor());

            tx.send(PreferenceCommand::Apply {
                update,
                applied: applied_tx,
            })
            .await
            .map_err(|e| IpcError::State {
                message: format!("Preference actor died: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;
        }

        applied_rx.await.map_err(|e| IpcError::State {
            message: format!("Preference actor dropped the update: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Current preferences (read-only copy).
    pub async fn snapshot(&self) -> Preferences {
        self.preferences.read().await.clone()
    }

    /// Credential for the next translation: stored key, else `GEMINI_API_KEY`.
    pub async fn credential(&self) -> Credential {
        resolve_credential(&*self.preferences.read().await)
    }

    fn spawn_actor(&self) -> mpsc::Sender<PreferenceCommand> {
        let (tx, rx) = mpsc::channel(100);
        tokio::spawn(preference_actor(
            rx,
            Arc::clone(&self.preferences),
            Arc::clone(&self.config_dir),
        ));
        info!("Preference store actor spawned");
        tx
    }
}

async fn preference_actor(
    mut command_rx: mpsc::Receiver<PreferenceCommand>,
    preferences: Arc<RwLock<Preferences>>,
    config_dir: Arc<Option<PathBuf>>,
) {
    while let Some(cmd) = command_rx.recv().await {
        match cmd {
            PreferenceCommand::Apply { update, applied } => {
                let updated = {
                    let mut preferences_write = preferences.write().await;
                    preferences_write.apply(update);
                    preferences_write.clone()
                };

                // Readers see the change even if the disk write below fails.
                let _ = applied.send(());

                if let Some(config_dir) = config_dir.as_ref()
                    && let Err(e) = updated.save(config_dir)
                {
                    error!("Preferences updated in memory but disk write failed: {e}");
                }
            }
        }
    }

    warn!("Preference store actor stopped");
}
