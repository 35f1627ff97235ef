pub mod credential_error;
pub mod error_location;
