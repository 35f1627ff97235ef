//! Shared building blocks for the translation host.
//!
//! Everything here is free of I/O so both the core library and the host
//! binary can depend on it without pulling in the network stack.
//!
//! - [`ErrorLocation`]: call-site capture attached to every error variant
//! - [`Credential`]: the provider API key, redacted and zeroized
//! - [`HttpStatusCode`]: status helpers used to classify upstream failures

pub mod credential;
pub mod error;
pub mod http_status;

#[cfg(test)]
mod tests;

pub use credential::Credential;
pub use error::credential_error::CredentialError;
pub use error::error_location::ErrorLocation;
pub use http_status::HttpStatusCode;
