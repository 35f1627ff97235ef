//! Scripted stand-in for the Gemini API.

use crate::error::BackendError;
use crate::gemini::GenerationBackend;
use crate::gemini::wire::GenerateContentResponse;
use crate::model_list::ModelSpec;

use common::{Credential, HttpStatusCode};

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use serde_json::json;

pub(crate) const QUOTA_BODY: &str = r#"{"error":{"code":429,"status":"RESOURCE_EXHAUSTED","message":"Quota exceeded for metric generate_content_free_tier_requests"}}"#;

/// What a model does when called.
#[derive(Clone)]
pub(crate) enum Reply {
    Text(&'static str),
    Truncated,
    NoCandidates,
    Status(u16, &'static str),
    /// Answers with the text after a delay.
    Delayed(Duration, &'static str),
    /// Never answers within any test timeout.
    Hang,
}

impl Reply {
    fn respond(&self, model: &str) -> Result<GenerateContentResponse, BackendError> {
        match self {
            Reply::Text(text) | Reply::Delayed(_, text) => Ok(response_with_text(text)),
            Reply::Truncated => Ok(parse_response(json!({
                "candidates": [{ "finishReason": "MAX_TOKENS", "content": { "parts": [{ "text": "Partial" }] } }]
            }))),
            Reply::NoCandidates => Ok(parse_response(json!({ "candidates": [] }))),
            Reply::Status(code, body) => Err(BackendError::from_http_response(
                model,
                HttpStatusCode(*code),
                body,
            )),
            Reply::Hang => Err(BackendError::client("no answer")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Call {
    pub model: String,
    pub prompt: String,
    pub max_output_tokens: u32,
    pub key: String,
}

/// Backend answering per model id. Unscripted models fail with HTTP 500.
#[derive(Default)]
pub(crate) struct ScriptedBackend {
    replies: HashMap<String, Reply>,
    /// Checked before `replies`: first entry whose needle is in the prompt.
    prompt_replies: Vec<(&'static str, Reply)>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply(mut self, model: &str, reply: Reply) -> Self {
        self.replies.insert(model.to_string(), reply);
        self
    }

    pub(crate) fn reply_when_prompt_contains(mut self, needle: &'static str, reply: Reply) -> Self {
        self.prompt_replies.push((needle, reply));
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn called_models(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.model).collect()
    }
}

impl GenerationBackend for ScriptedBackend {
    async fn generate(
        &self,
        model: &ModelSpec,
        prompt: &str,
        credential: &Credential,
    ) -> Result<GenerateContentResponse, BackendError> {
        self.calls.lock().unwrap().push(Call {
            model: model.id().to_string(),
            prompt: prompt.to_string(),
            max_output_tokens: model.max_output_tokens(),
            key: credential.expose().to_string(),
        });

        let reply = self
            .prompt_replies
            .iter()
            .find(|(needle, _)| prompt.contains(needle))
            .map(|(_, reply)| reply)
            .or_else(|| self.replies.get(model.id()))
            .cloned()
            .unwrap_or(Reply::Status(500, "internal"));

        match reply {
            Reply::Hang => tokio::time::sleep(Duration::from_secs(3600)).await,
            Reply::Delayed(after, _) => tokio::time::sleep(after).await,
            _ => {}
        }

        reply.respond(model.id())
    }
}

pub(crate) fn response_with_text(text: &str) -> GenerateContentResponse {
    parse_response(json!({
        "candidates": [{ "finishReason": "STOP", "content": { "parts": [{ "text": text }] } }]
    }))
}

pub(crate) fn parse_response(value: serde_json::Value) -> GenerateContentResponse {
    serde_json::from_value(value).unwrap()
}
