use translate_core::error::{BackendError, ConfigError, IpcError};

use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error;

/// Errors that stop the host from starting.
///
/// Core errors are flattened to their message; the location recorded is the
/// host call site that gave up.
#[derive(Debug, Error)]
pub enum HostError {
    /// Error from this binary (paths, logging)
    #[error("Host Error: {message} {location}")]
    Host {
        message: String,
        location: ErrorLocation,
    },

    /// Error from translate-core (config, client, IPC bind)
    #[error("Core Error: {message} {location}")]
    Core {
        message: String,
        location: ErrorLocation,
    },
}

impl HostError {
    #[track_caller]
    pub fn host(message: impl Into<String>) -> Self {
        HostError::Host {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ConfigError> for HostError {
    #[track_caller]
    fn from(error: ConfigError) -> Self {
        HostError::Core {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<BackendError> for HostError {
    #[track_caller]
    fn from(error: BackendError) -> Self {
        HostError::Core {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<IpcError> for HostError {
    #[track_caller]
    fn from(error: IpcError) -> Self {
        HostError::Core {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
