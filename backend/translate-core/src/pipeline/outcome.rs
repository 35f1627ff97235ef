//! Classification of a single model attempt.

use crate::error::BackendError;
use crate::gemini::wire::GenerateContentResponse;

use serde::{Deserialize, Serialize};

use std::fmt;
use std::time::Duration;

/// What to do when a model reports quota or rate-limit exhaustion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaPolicy {
    /// Stop the chain and report `QuotaExceeded` for that model.
    #[default]
    Terminal,
    /// Treat it like any other failure and try the next model.
    SkipModel,
}

/// Result of one attempt, driving the fallback loop.
#[derive(Debug)]
pub enum AttemptOutcome {
    /// Raw, unsanitized model text.
    Success(String),
    RetryableFailure(FailureReason),
    TerminalFailure(FailureReason),
}

impl AttemptOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            AttemptOutcome::Success(_) => "success",
            AttemptOutcome::RetryableFailure(_) => "retryable",
            AttemptOutcome::TerminalFailure(_) => "terminal",
        }
    }
}

#[derive(Debug)]
pub enum FailureReason {
    Backend(BackendError),
    Timeout { after: Duration },
    /// Finish reason `MAX_TOKENS`.
    Truncated,
    /// No candidate, or a candidate without text.
    EmptyCandidate,
    /// Text was present but sanitization removed all of it.
    EmptyAfterSanitization,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Backend(error) => write!(f, "{}", error),
            FailureReason::Timeout { after } => {
                write!(f, "no response within {}ms", after.as_millis())
            }
            FailureReason::Truncated => write!(f, "output truncated at max tokens"),
            FailureReason::EmptyCandidate => write!(f, "response contained no text"),
            FailureReason::EmptyAfterSanitization => {
                write!(f, "response was empty after cleanup")
            }
        }
    }
}

/// Classify the backend result of one attempt.
///
/// Quota exhaustion is terminal or retryable according to `quota_policy`;
/// every other failure is retryable.
pub fn classify(
    result: Result<GenerateContentResponse, BackendError>,
    quota_policy: QuotaPolicy,
) -> AttemptOutcome {
    let response = match result {
        Ok(response) => response,
        Err(error) if error.is_quota_exhausted() && quota_policy == QuotaPolicy::Terminal => {
            return AttemptOutcome::TerminalFailure(FailureReason::Backend(error));
        }
        Err(error) => return AttemptOutcome::RetryableFailure(FailureReason::Backend(error)),
    };

    let Some(candidate) = response.first_candidate() else {
        return AttemptOutcome::RetryableFailure(FailureReason::EmptyCandidate);
    };

    if candidate.is_truncated() {
        return AttemptOutcome::RetryableFailure(FailureReason::Truncated);
    }

    match candidate.text() {
        Some(text) => AttemptOutcome::Success(text.to_string()),
        None => AttemptOutcome::RetryableFailure(FailureReason::EmptyCandidate),
    }
}
