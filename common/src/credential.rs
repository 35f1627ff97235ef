//! The provider API key.
//!
//! The key is only ever read back through [`Credential::expose`], at the single
//! place where it is attached to an outgoing request. Every other path
//! (logging, debug output, serialization) sees a redacted value.

use crate::{CredentialError, ErrorLocation};

use std::fmt;
use std::panic::Location;

use serde::ser::Error;
use zeroize::Zeroize;

/// An opaque API credential. Its format is never validated, only its presence.
#[derive(Clone, Default)]
pub struct Credential {
    inner: String,
}

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        let mut key = key.into();
        let trimmed = key.trim();
        if trimmed.len() != key.len() {
            let owned = trimmed.to_string();
            key.zeroize();
            key = owned;
        }
        Self { inner: key }
    }

    /// Wrap a stored value, treating blank strings as absent.
    pub fn from_optional(key: Option<String>) -> Option<Self> {
        key.map(Self::new).filter(Credential::is_present)
    }

    /// The raw key, for the request that carries it upstream.
    #[inline]
    pub fn expose(&self) -> &str {
        &self.inner
    }

    /// Key length (safe to log).
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    pub fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential([REDACTED])")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED CREDENTIAL]")
    }
}

impl Drop for Credential {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

impl serde::Serialize for Credential {
    fn serialize<S>(&self, _serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        Err(S::Error::custom(CredentialError::Serialization {
            message: String::from("Credential cannot be serialized - use expose() explicitly"),
            location: ErrorLocation::from(Location::caller()),
        }))
    }
}
