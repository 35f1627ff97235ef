//! Model-fallback translation pipeline.
//!
//! `translate` walks the [`ModelList`] front to back. Each model gets exactly
//! one attempt with the same prompt, bounded by a fixed timeout. The first
//! usable response is sanitized and returned; retryable failures move on to
//! the next model; a terminal failure (quota exhaustion under
//! [`QuotaPolicy::Terminal`]) ends the chain early. There is no backoff and no
//! wrap-around: at most `models.len()` requests are made per call.
//!
//! The pipeline holds no mutable state and can be shared between tasks.

pub mod outcome;
pub mod prompt;
pub mod sanitize;

pub use outcome::{AttemptOutcome, FailureReason, QuotaPolicy, classify};
pub use prompt::build_prompt;
pub use sanitize::SanitizationRules;

use crate::error::TranslationError;
use crate::gemini::GenerationBackend;
use crate::model_list::{ModelList, ModelSpec};

use common::Credential;

use std::time::Duration;

use log::{debug, error, info, warn};

/// Default per-attempt timeout.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(8);

/// One translation job. Immutable once built.
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    source_text: String,
    target_language: String,
    credential: Credential,
}

impl TranslationRequest {
    pub fn new(
        source_text: impl Into<String>,
        target_language: impl Into<String>,
        credential: Credential,
    ) -> Self {
        Self {
            source_text: source_text.into(),
            target_language: target_language.into(),
            credential,
        }
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }
}

/// Tunables that apply uniformly to every attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    pub attempt_timeout: Duration,
    pub quota_policy: QuotaPolicy,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            quota_policy: QuotaPolicy::default(),
        }
    }
}

pub struct TranslationPipeline<B> {
    backend: B,
    models: ModelList,
    settings: PipelineSettings,
    rules: &'static SanitizationRules,
}

impl<B: GenerationBackend> TranslationPipeline<B> {
    pub fn new(backend: B, models: ModelList, settings: PipelineSettings) -> Self {
        Self {
            backend,
            models,
            settings,
            rules: SanitizationRules::standard(),
        }
    }

    pub fn models(&self) -> &ModelList {
        &self.models
    }

    pub fn settings(&self) -> PipelineSettings {
        self.settings
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Translate `request`, falling back through the model list.
    ///
    /// # Errors
    ///
    /// - [`TranslationError::MissingCredential`] when the credential is empty (no request made)
    /// - [`TranslationError::EmptyText`] when the source text is blank (no request made)
    /// - [`TranslationError::QuotaExceeded`] when a model reports quota exhaustion
    ///   under [`QuotaPolicy::Terminal`]
    /// - [`TranslationError::AllModelsExhausted`] when every model failed retryably
    pub async fn translate(&self, request: &TranslationRequest) -> Result<String, TranslationError> {
        if !request.credential().is_present() {
            return Err(TranslationError::missing_credential());
        }

        if request.source_text().trim().is_empty() {
            return Err(TranslationError::empty_text());
        }

        let prompt = build_prompt(request.target_language(), request.source_text());
        let total = self.models.len();
        let mut last_failure: Option<FailureReason> = None;

        info!(
            "Translating {} chars to {} across {} model(s)",
            request.source_text().chars().count(),
            request.target_language(),
            total
        );

        for (index, model) in self.models.iter().enumerate() {
            let attempt = index + 1;
            debug!("Trying {} ({attempt}/{total})", model.id());

            match self.attempt(model, &prompt, request.credential()).await {
                AttemptOutcome::Success(translation) => {
                    info!(
                        "{} succeeded ({attempt}/{total}), {} chars",
                        model.id(),
                        translation.chars().count()
                    );
                    return Ok(translation);
                }
                AttemptOutcome::RetryableFailure(reason) => {
                    warn!(
                        "{} failed ({attempt}/{total}): {reason}. Trying next...",
                        model.id()
                    );
                    last_failure = Some(reason);
                }
                AttemptOutcome::TerminalFailure(reason) => {
                    error!(
                        "{} failed terminally ({attempt}/{total}): {reason}",
                        model.id()
                    );
                    return Err(terminal_error(model, reason));
                }
            }
        }

        let last_failure = last_failure
            .map(|reason| reason.to_string())
            .unwrap_or_default();
        error!("All {total} model(s) exhausted, last failure: {last_failure}");

        Err(TranslationError::all_models_exhausted(total, last_failure))
    }

    /// A single, timeout-bounded attempt against one model.
    async fn attempt(
        &self,
        model: &ModelSpec,
        prompt: &str,
        credential: &Credential,
    ) -> AttemptOutcome {
        let timeout = self.settings.attempt_timeout;
        let result = tokio::time::timeout(
            timeout,
            self.backend.generate(model, prompt, credential),
        )
        .await;

        let outcome = match result {
            Ok(result) => classify(result, self.settings.quota_policy),
            Err(_elapsed) => {
                return AttemptOutcome::RetryableFailure(FailureReason::Timeout { after: timeout });
            }
        };

        match outcome {
            AttemptOutcome::Success(raw) => {
                let cleaned = self.rules.apply(&raw);
                if cleaned.is_empty() {
                    AttemptOutcome::RetryableFailure(FailureReason::EmptyAfterSanitization)
                } else {
                    AttemptOutcome::Success(cleaned)
                }
            }
            other => other,
        }
    }
}

#[track_caller]
fn terminal_error(model: &ModelSpec, reason: FailureReason) -> TranslationError {
    match reason {
        FailureReason::Backend(error) => {
            TranslationError::quota_exceeded(model.id(), error.message())
        }
        other => TranslationError::quota_exceeded(model.id(), other.to_string()),
    }
}
