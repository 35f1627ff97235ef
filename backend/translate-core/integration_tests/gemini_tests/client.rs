use super::helpers::{TEST_API_KEY, generate_path, quota_body, success_body};

use translate_core::gemini::{GeminiClient, GenerationBackend};
use translate_core::model_list::ModelSpec;

use common::Credential;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// **VALUE**: Verifies the exact request shape sent to the provider.
///
/// **WHY THIS MATTERS**: Deterministic decoding (temperature 0, topP 0.1, topK 1), the
/// per-model output cap, and an empty safety list are what keep replies short and stable.
/// The key travels as the `key` query parameter.
///
/// **BUG THIS CATCHES**: Would catch snake_case field names on the wire, a missing key,
/// or the cap of the wrong model being sent.
#[tokio::test]
async fn given_model_and_prompt_when_generate_then_request_matches_api_contract() {
    // GIVEN: A provider expecting one well-formed request
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(generate_path("gemini-2.5-flash")))
        .and(query_param("key", TEST_API_KEY))
        .and(body_partial_json(json!({
            "contents": [{ "parts": [{ "text": "the prompt" }] }],
            "generationConfig": {
                "temperature": 0.0,
                "maxOutputTokens": 300,
                "topP": 0.1,
                "topK": 1
            },
            "safetySettings": []
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body("Bonjour")))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(&server.uri()).expect("valid base url");

    // WHEN: Generating
    let response = client
        .generate(
            &ModelSpec::new("gemini-2.5-flash"),
            "the prompt",
            &Credential::new(TEST_API_KEY),
        )
        .await
        .expect("request should match the mock");

    // THEN: The candidate text is decoded
    let candidate = response.first_candidate().expect("one candidate");
    assert_eq!(candidate.text(), Some("Bonjour"));
    assert!(!candidate.is_truncated());
}

#[tokio::test]
async fn given_pro_model_when_generate_then_sends_lower_output_cap() {
    // GIVEN: A provider that only answers when the cap is 150
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(generate_path("gemini-pro")))
        .and(body_partial_json(json!({ "generationConfig": { "maxOutputTokens": 150 } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body("Salut")))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(&format!("{}/", server.uri())).expect("valid base url");

    // WHEN: Generating with the pro model (base url has a trailing slash)
    let result = client
        .generate(&ModelSpec::new("gemini-pro"), "p", &Credential::new(TEST_API_KEY))
        .await;

    // THEN: The request matched
    assert!(result.is_ok(), "unexpected error: {:?}", result.err());
}

/// **VALUE**: Verifies a 429 quota response becomes a quota-classified error.
///
/// **BUG THIS CATCHES**: Would catch the provider's envelope being discarded, which
/// turns a quota stop into a silent fallback.
#[tokio::test]
async fn given_quota_response_when_generate_then_error_is_quota_exhausted() {
    // GIVEN: A provider out of quota
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(generate_path("gemini-2.5-flash")))
        .respond_with(ResponseTemplate::new(429).set_body_json(quota_body()))
        .mount(&server)
        .await;

    let client = GeminiClient::new(&server.uri()).expect("valid base url");

    // WHEN: Generating
    let err = client
        .generate(
            &ModelSpec::new("gemini-2.5-flash"),
            "p",
            &Credential::new(TEST_API_KEY),
        )
        .await
        .expect_err("429 must be an error");

    // THEN: Status, provider message and classification are kept
    assert!(err.is_quota_exhausted());
    assert_eq!(err.status_code(), Some(429));
    assert!(err.message().starts_with("Quota exceeded"));
}

#[tokio::test]
async fn given_garbage_body_when_generate_then_decode_error() {
    // GIVEN: A 200 with a non-JSON body
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(generate_path("gemini-1.5-flash")))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = GeminiClient::new(&server.uri()).expect("valid base url");

    // WHEN: Generating
    let err = client
        .generate(
            &ModelSpec::new("gemini-1.5-flash"),
            "p",
            &Credential::new(TEST_API_KEY),
        )
        .await
        .expect_err("non-JSON body must be an error");

    // THEN: It is a decode error for that model
    assert_eq!(err.error_category(), "decode");
    assert_eq!(err.model(), Some("gemini-1.5-flash"));
}

/// **VALUE**: Verifies the API key never appears in formatted network errors.
///
/// **WHY THIS MATTERS**: The key is a query parameter, and reqwest includes the URL in
/// its error text by default. Backend errors end up in the log file.
///
/// **BUG THIS CATCHES**: Would catch a missing `without_url()` on reqwest errors.
#[tokio::test]
async fn given_unreachable_provider_when_generate_then_error_omits_api_key() {
    // GIVEN: A port that was bound and released, so connections are refused
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        listener.local_addr().expect("local addr").port()
    };

    let client = GeminiClient::new(&format!("http://127.0.0.1:{port}")).expect("valid base url");

    // WHEN: Generating
    let err = client
        .generate(
            &ModelSpec::new("gemini-2.5-flash"),
            "p",
            &Credential::new(TEST_API_KEY),
        )
        .await
        .expect_err("connection must fail");

    // THEN: The error text carries no key
    assert!(!format!("{err}").contains(TEST_API_KEY));
    assert!(!format!("{err:?}").contains(TEST_API_KEY));
}

#[test]
fn given_relative_base_url_when_new_then_endpoint_error() {
    // WHEN: Building a client from a path without scheme
    let result = GeminiClient::new("generativelanguage.googleapis.com/v1beta");

    // THEN: Rejected as an endpoint error
    let err = result.err().expect("relative url must be rejected");
    assert_eq!(err.error_category(), "endpoint");
}
