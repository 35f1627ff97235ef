//! Shared state behind every IPC connection.

use crate::gemini::GenerationBackend;
use crate::ipc::preference_store::PreferenceStore;
use crate::pipeline::TranslationPipeline;
use crate::session::SessionRegistry;

use std::sync::Arc;

use tokio::sync::Mutex;

/// What a connection needs to serve requests.
///
/// Cheap to clone; clones share the pipeline, the session registry and the
/// preference store.
pub struct HostState<B> {
    pipeline: Arc<TranslationPipeline<B>>,
    sessions: Arc<Mutex<SessionRegistry>>,
    preferences: PreferenceStore,
}

impl<B> Clone for HostState<B> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            sessions: Arc::clone(&self.sessions),
            preferences: self.preferences.clone(),
        }
    }
}

impl<B: GenerationBackend> HostState<B> {
    pub fn new(
        pipeline: TranslationPipeline<B>,
        sessions: SessionRegistry,
        preferences: PreferenceStore,
    ) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            sessions: Arc::new(Mutex::new(sessions)),
            preferences,
        }
    }

    pub fn pipeline(&self) -> &TranslationPipeline<B> {
        &self.pipeline
    }

    pub fn sessions(&self) -> &Mutex<SessionRegistry> {
        &self.sessions
    }

    pub fn preferences(&self) -> &PreferenceStore {
        &self.preferences
    }
}
