//! Ordered model fallback list.
//!
//! The list is fixed at startup and traversed front to back, most preferred
//! model first. It is never empty and traversal never wraps around.

use crate::error::ConfigError;

use std::slice::Iter;

/// Output cap for `pro` models.
pub const PRO_MAX_OUTPUT_TOKENS: u32 = 150;

/// Output cap for every other model.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 300;

/// Built-in fallback order.
pub const DEFAULT_MODEL_IDS: &[&str] = &[
    "gemini-2.5-flash",
    "gemini-2.5-flash-lite-preview-09-2025",
    "gemini-1.5-flash",
    "gemini-pro",
];

/// One entry of the fallback list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    id: String,
    max_output_tokens: u32,
}

impl ModelSpec {
    /// Model with the output cap derived from its identifier.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let max_output_tokens = default_max_output_tokens(&id);
        Self {
            id,
            max_output_tokens,
        }
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn max_output_tokens(&self) -> u32 {
        self.max_output_tokens
    }
}

fn default_max_output_tokens(id: &str) -> u32 {
    if id.contains("pro") {
        PRO_MAX_OUTPUT_TOKENS
    } else {
        DEFAULT_MAX_OUTPUT_TOKENS
    }
}

/// Non-empty, ordered list of models to try.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelList {
    models: Vec<ModelSpec>,
}

impl ModelList {
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if the list is empty, an id is
    /// blank or contains characters that cannot appear in the endpoint path,
    /// or an id appears twice.
    #[track_caller]
    pub fn new(models: Vec<ModelSpec>) -> Result<Self, ConfigError> {
        if models.is_empty() {
            return Err(ConfigError::validation("Model list cannot be empty"));
        }

        for (index, model) in models.iter().enumerate() {
            if model.id.trim().is_empty() {
                return Err(ConfigError::validation(format!(
                    "Model #{} has an empty id",
                    index + 1
                )));
            }

            if !model
                .id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            {
                return Err(ConfigError::validation(format!(
                    "Invalid model id '{}'",
                    model.id
                )));
            }

            if model.max_output_tokens == 0 {
                return Err(ConfigError::validation(format!(
                    "Model '{}' has max_output_tokens = 0",
                    model.id
                )));
            }

            if models[..index].iter().any(|m| m.id == model.id) {
                return Err(ConfigError::validation(format!(
                    "Model '{}' listed twice",
                    model.id
                )));
            }
        }

        Ok(Self { models })
    }

    pub fn iter(&self) -> Iter<'_, ModelSpec> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn primary(&self) -> &ModelSpec {
        &self.models[0]
    }

    pub fn ids(&self) -> Vec<&str> {
        self.models.iter().map(ModelSpec::id).collect()
    }
}

impl Default for ModelList {
    fn default() -> Self {
        Self {
            models: DEFAULT_MODEL_IDS.iter().map(|id| ModelSpec::new(*id)).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ModelList {
    type Item = &'a ModelSpec;
    type IntoIter = Iter<'a, ModelSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
