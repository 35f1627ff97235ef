//! Errors surfaced by the translation pipeline to its caller.
//!
//! Per-attempt failures never show up here: they are absorbed by the fallback
//! loop. Only the final, unrecoverable state of a `translate` call is reported.

use common::ErrorLocation;
use std::panic::Location;
use thiserror::Error as ThisError;

/// Message shown when every model failed for non-quota reasons.
pub const ALL_MODELS_EXHAUSTED_MESSAGE: &str = "All models exhausted. Check quotas or try later.";

/// Message shown when no API key is configured.
pub const MISSING_CREDENTIAL_MESSAGE: &str = "Please set your Gemini API key";

/// Message shown when the source text is blank.
pub const EMPTY_TEXT_MESSAGE: &str = "Please enter text to translate";

#[derive(Debug, ThisError)]
pub enum TranslationError {
    #[error("Missing Credential Error: no API key configured {location}")]
    MissingCredential { location: ErrorLocation },

    #[error("Empty Text Error: source text is blank {location}")]
    EmptyText { location: ErrorLocation },

    #[error("Quota Exceeded Error: '{model}': {message} {location}")]
    QuotaExceeded {
        model: String,
        message: String,
        location: ErrorLocation,
    },

    #[error(
        "All Models Exhausted Error: {attempts} attempt(s), last failure: {last_failure} {location}"
    )]
    AllModelsExhausted {
        attempts: usize,
        last_failure: String,
        location: ErrorLocation,
    },
}

impl TranslationError {
    #[track_caller]
    pub fn missing_credential() -> Self {
        TranslationError::MissingCredential {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn empty_text() -> Self {
        TranslationError::EmptyText {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn quota_exceeded(model: impl Into<String>, message: impl Into<String>) -> Self {
        TranslationError::QuotaExceeded {
            model: model.into(),
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn all_models_exhausted(attempts: usize, last_failure: impl Into<String>) -> Self {
        TranslationError::AllModelsExhausted {
            attempts,
            last_failure: last_failure.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Text for the UI. No locations, no model internals beyond the quota case.
    pub fn user_message(&self) -> String {
        match self {
            TranslationError::MissingCredential { .. } => MISSING_CREDENTIAL_MESSAGE.to_string(),
            TranslationError::EmptyText { .. } => EMPTY_TEXT_MESSAGE.to_string(),
            TranslationError::QuotaExceeded { model, .. } => format!(
                "Free tier quota exceeded on {model}. Check aistudio.google.com or wait for reset."
            ),
            TranslationError::AllModelsExhausted { .. } => ALL_MODELS_EXHAUSTED_MESSAGE.to_string(),
        }
    }

    /// Get error category for logs.
    pub fn error_category(&self) -> &'static str {
        match self {
            TranslationError::MissingCredential { .. } => "missing_credential",
            TranslationError::EmptyText { .. } => "empty_text",
            TranslationError::QuotaExceeded { .. } => "quota_exceeded",
            TranslationError::AllModelsExhausted { .. } => "all_models_exhausted",
        }
    }

    /// True when no upstream request was made.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            TranslationError::MissingCredential { .. } | TranslationError::EmptyText { .. }
        )
    }
}
