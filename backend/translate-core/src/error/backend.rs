//! Errors from a single call to the generation API.
//!
//! - HTTP status codes are stored as numbers, never parsed back out of text
//! - the provider's `error.status` string is kept separately for quota detection
//! - reqwest errors are stripped of their URL before formatting, since the URL
//!   carries the API key as a query parameter

use crate::gemini::wire::{API_STATUS_RESOURCE_EXHAUSTED, ApiErrorEnvelope};

use common::{ErrorLocation, HttpStatusCode};

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum BackendError {
    #[error("HTTP Error: '{model}': HTTP {status_code} - {message} {location}")]
    Status {
        model: String,
        status_code: HttpStatusCode,
        api_status: Option<String>,
        message: String,
        location: ErrorLocation,
    },

    #[error("Network Error: '{model}': {message} {location}")]
    Network {
        model: String,
        message: String,
        is_timeout: bool,
        is_connection: bool,
        location: ErrorLocation,
    },

    #[error("Decode Error: '{model}': {message} {location}")]
    Decode {
        model: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Endpoint Error: {message} {location}")]
    Endpoint {
        message: String,
        location: ErrorLocation,
    },

    #[error("Client Error: {message} {location}")]
    Client {
        message: String,
        location: ErrorLocation,
    },
}

impl BackendError {
    /// Create from reqwest error with proper categorization.
    #[track_caller]
    pub fn from_reqwest(model: impl Into<String>, error: reqwest::Error) -> Self {
        let model = model.into();
        let is_timeout = error.is_timeout();
        let is_connection = error.is_connect();
        let error = error.without_url();

        BackendError::Network {
            model,
            message: error.to_string(),
            is_timeout,
            is_connection,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Create from a non-success response, reading the provider's error envelope if present.
    #[track_caller]
    pub fn from_http_response(
        model: impl Into<String>,
        status_code: HttpStatusCode,
        body: &str,
    ) -> Self {
        let (api_status, message) = match serde_json::from_str::<ApiErrorEnvelope>(body) {
            Ok(envelope) => (
                envelope.error.status,
                envelope
                    .error
                    .message
                    .unwrap_or_else(|| format!("HTTP {status_code}")),
            ),
            Err(_) => (None, body.trim().to_string()),
        };

        BackendError::Status {
            model: model.into(),
            status_code,
            api_status,
            message,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn decode(model: impl Into<String>, message: impl Into<String>) -> Self {
        BackendError::Decode {
            model: model.into(),
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn endpoint(message: impl Into<String>) -> Self {
        BackendError::Endpoint {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn client(message: impl Into<String>) -> Self {
        BackendError::Client {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Quota or rate-limit exhaustion, from the provider status string or a 429.
    pub fn is_quota_exhausted(&self) -> bool {
        match self {
            BackendError::Status {
                status_code,
                api_status,
                ..
            } => {
                api_status.as_deref() == Some(API_STATUS_RESOURCE_EXHAUSTED)
                    || status_code.is_rate_limited()
            }
            _ => false,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, BackendError::Network { is_timeout: true, .. })
    }

    /// Get error category for logs.
    pub fn error_category(&self) -> &'static str {
        match self {
            BackendError::Status { .. } if self.is_quota_exhausted() => "quota",
            BackendError::Status { status_code, .. } if status_code.is_client_error() => {
                "client_error"
            }
            BackendError::Status { status_code, .. } if status_code.is_server_error() => {
                "server_error"
            }
            BackendError::Status { .. } => "http_status",
            BackendError::Network { is_timeout: true, .. } => "timeout",
            BackendError::Network {
                is_connection: true,
                ..
            } => "connection",
            BackendError::Network { .. } => "network",
            BackendError::Decode { .. } => "decode",
            BackendError::Endpoint { .. } => "endpoint",
            BackendError::Client { .. } => "client",
        }
    }

    /// Get the model name if applicable.
    pub fn model(&self) -> Option<&str> {
        match self {
            BackendError::Status { model, .. }
            | BackendError::Network { model, .. }
            | BackendError::Decode { model, .. } => Some(model),
            _ => None,
        }
    }

    /// Provider message without location, for the terminal quota error.
    pub fn message(&self) -> &str {
        match self {
            BackendError::Status { message, .. }
            | BackendError::Network { message, .. }
            | BackendError::Decode { message, .. }
            | BackendError::Endpoint { message, .. }
            | BackendError::Client { message, .. } => message,
        }
    }

    /// Get HTTP status code if applicable.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            BackendError::Status { status_code, .. } => Some(status_code.0),
            _ => None,
        }
    }
}

impl From<url::ParseError> for BackendError {
    #[track_caller]
    fn from(error: url::ParseError) -> Self {
        BackendError::Endpoint {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
