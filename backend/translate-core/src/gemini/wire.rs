//! JSON shapes of the `generateContent` endpoint.
//!
//! Response structs default every field: the provider omits `content` on
//! blocked candidates and `candidates` entirely on some failures, and those
//! cases must classify as "no usable text" rather than as decode errors.

use serde::{Deserialize, Serialize};

/// Finish reason reported when generation hit `maxOutputTokens`.
pub const FINISH_REASON_MAX_TOKENS: &str = "MAX_TOKENS";

/// Provider status string for quota and rate-limit exhaustion.
pub const API_STATUS_RESOURCE_EXHAUSTED: &str = "RESOURCE_EXHAUSTED";

const DETERMINISTIC_TEMPERATURE: f64 = 0.0;
const DETERMINISTIC_TOP_P: f64 = 0.1;
const DETERMINISTIC_TOP_K: u32 = 1;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
    pub safety_settings: Vec<serde_json::Value>,
}

impl GenerateContentRequest {
    pub fn new(prompt: &str, generation_config: GenerationConfig) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config,
            safety_settings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub top_p: f64,
    pub top_k: u32,
}

impl GenerationConfig {
    /// Greedy decoding, so repeated requests give the same translation.
    pub fn deterministic(max_output_tokens: u32) -> Self {
        Self {
            temperature: DETERMINISTIC_TEMPERATURE,
            max_output_tokens,
            top_p: DETERMINISTIC_TOP_P,
            top_k: DETERMINISTIC_TOP_K,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    pub fn first_candidate(&self) -> Option<&Candidate> {
        self.candidates.first()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub content: Option<Content>,
}

impl Candidate {
    /// Generation stopped at the output cap.
    pub fn is_truncated(&self) -> bool {
        self.finish_reason.as_deref() == Some(FINISH_REASON_MAX_TOKENS)
    }

    /// Text of the first part, if it holds anything besides whitespace.
    pub fn text(&self) -> Option<&str> {
        self.content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
