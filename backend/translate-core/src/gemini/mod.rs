//! Upstream generation API.
//!
//! [`GenerationBackend`] is the seam the pipeline is generic over: production
//! code uses [`GeminiClient`], tests substitute scripted backends.

pub mod wire;

use crate::error::BackendError;
use crate::model_list::ModelSpec;

use wire::{GenerateContentRequest, GenerateContentResponse, GenerationConfig};

use common::{Credential, HttpStatusCode};

use std::future::Future;
use std::time::Duration;

use log::debug;
use reqwest::Client;
use url::Url;

/// Upper bound for a request that somehow outlives the pipeline's own attempt timeout.
const CLIENT_TIMEOUT_DURATION: Duration = Duration::from_secs(60);
const GENERATE_CONTENT_METHOD: &str = "generateContent";
const API_KEY_QUERY_PARAM: &str = "key";

/// One generation request against one model.
pub trait GenerationBackend: Send + Sync {
    fn generate(
        &self,
        model: &ModelSpec,
        prompt: &str,
        credential: &Credential,
    ) -> impl Future<Output = Result<GenerateContentResponse, BackendError>> + Send;
}

/// HTTP client for `POST {base}/models/{model}:generateContent?key=...`.
#[derive(Clone)]
pub struct GeminiClient {
    base_url: String,
    client: Client,
}

impl GeminiClient {
    /// # Errors
    ///
    /// Returns [`BackendError::Endpoint`] if `base_url` is not an absolute URL,
    /// or [`BackendError::Client`] if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        let parsed = Url::parse(base_url)?;
        if parsed.cannot_be_a_base() {
            return Err(BackendError::endpoint(format!(
                "Base URL cannot carry a path: {base_url}"
            )));
        }

        let client = Client::builder()
            .timeout(CLIENT_TIMEOUT_DURATION)
            .build()
            .map_err(|e| BackendError::client(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, model: &ModelSpec, credential: &Credential) -> Result<Url, BackendError> {
        let mut url = Url::parse(&format!(
            "{}/models/{}:{GENERATE_CONTENT_METHOD}",
            self.base_url,
            model.id()
        ))?;
        url.query_pairs_mut()
            .append_pair(API_KEY_QUERY_PARAM, credential.expose());
        Ok(url)
    }
}

impl GenerationBackend for GeminiClient {
    async fn generate(
        &self,
        model: &ModelSpec,
        prompt: &str,
        credential: &Credential,
    ) -> Result<GenerateContentResponse, BackendError> {
        let url = self.endpoint(model, credential)?;
        let body = GenerateContentRequest::new(
            prompt,
            GenerationConfig::deterministic(model.max_output_tokens()),
        );

        debug!(
            "POST {}/models/{}:{GENERATE_CONTENT_METHOD} (maxOutputTokens={})",
            self.base_url,
            model.id(),
            model.max_output_tokens()
        );

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(model.id(), e))?;

        let status_code = HttpStatusCode(response.status().as_u16());
        let text = response
            .text()
            .await
            .map_err(|e| BackendError::from_reqwest(model.id(), e))?;

        if !status_code.is_success() {
            return Err(BackendError::from_http_response(
                model.id(),
                status_code,
                &text,
            ));
        }

        serde_json::from_str(&text).map_err(|e| BackendError::decode(model.id(), e.to_string()))
    }
}
