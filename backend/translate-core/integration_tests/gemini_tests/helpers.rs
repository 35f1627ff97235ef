use translate_core::gemini::GeminiClient;
use translate_core::model_list::ModelList;
use translate_core::pipeline::{
    PipelineSettings, QuotaPolicy, TranslationPipeline, TranslationRequest,
};

use common::Credential;

use std::time::Duration;

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_API_KEY: &str = "test-key-123";

pub fn generate_path(model: &str) -> String {
    format!("/models/{model}:generateContent")
}

pub fn success_body(text: &str) -> Value {
    json!({
        "candidates": [{
            "finishReason": "STOP",
            "content": { "parts": [{ "text": text }] }
        }]
    })
}

pub fn truncated_body() -> Value {
    json!({
        "candidates": [{
            "finishReason": "MAX_TOKENS",
            "content": { "parts": [{ "text": "Bonj" }] }
        }]
    })
}

pub fn quota_body() -> Value {
    json!({
        "error": {
            "code": 429,
            "status": "RESOURCE_EXHAUSTED",
            "message": "Quota exceeded for metric generate_content_free_tier_requests"
        }
    })
}

pub async fn mount_reply(server: &MockServer, model: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(generate_path(model)))
        .respond_with(response)
        .mount(server)
        .await;
}

pub fn pipeline_against(
    server: &MockServer,
    attempt_timeout: Duration,
    quota_policy: QuotaPolicy,
) -> TranslationPipeline<GeminiClient> {
    let client = GeminiClient::new(&server.uri()).expect("mock server uri is a valid base url");
    TranslationPipeline::new(
        client,
        ModelList::default(),
        PipelineSettings {
            attempt_timeout,
            quota_policy,
        },
    )
}

pub fn french_request(text: &str) -> TranslationRequest {
    TranslationRequest::new(text, "French", Credential::new(TEST_API_KEY))
}

/// Models that received at least one request, in arrival order.
pub async fn requested_models(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|request| {
            request
                .url
                .path()
                .strip_prefix("/models/")
                .and_then(|rest| rest.strip_suffix(":generateContent"))
                .map(str::to_string)
        })
        .collect()
}
