use super::helpers::{
    french_request, mount_reply, pipeline_against, quota_body, requested_models, success_body,
    truncated_body,
};

use translate_core::error::TranslationError;
use translate_core::pipeline::{DEFAULT_ATTEMPT_TIMEOUT, QuotaPolicy};

use std::time::Duration;

use wiremock::{MockServer, ResponseTemplate};

/// **VALUE**: Verifies the full chain over real HTTP: failures are skipped in order and
/// the first usable answer is sanitized and returned.
///
/// **WHY THIS MATTERS**: This is the user-visible behavior of a translation when the
/// preferred models are unavailable.
///
/// **BUG THIS CATCHES**: Would catch the loop stopping on a retryable failure, trying
/// models out of order, or returning the model's commentary unsanitized.
#[tokio::test]
async fn given_first_two_models_fail_when_translate_then_third_answers_sanitized() {
    // GIVEN: Model 1 returns 503, model 2 truncates, model 3 answers with a preamble
    let server = MockServer::start().await;
    mount_reply(&server, "gemini-2.5-flash", ResponseTemplate::new(503)).await;
    mount_reply(
        &server,
        "gemini-2.5-flash-lite-preview-09-2025",
        ResponseTemplate::new(200).set_body_json(truncated_body()),
    )
    .await;
    mount_reply(
        &server,
        "gemini-1.5-flash",
        ResponseTemplate::new(200).set_body_json(success_body("Translation: **Bonjour le monde**")),
    )
    .await;

    let pipeline = pipeline_against(&server, DEFAULT_ATTEMPT_TIMEOUT, QuotaPolicy::Terminal);

    // WHEN: Translating
    let result = pipeline.translate(&french_request("Hello world")).await;

    // THEN: The third model's cleaned answer comes back, and the fourth was never called
    assert_eq!(result.expect("third model succeeds"), "Bonjour le monde");
    assert_eq!(
        requested_models(&server).await,
        vec![
            "gemini-2.5-flash",
            "gemini-2.5-flash-lite-preview-09-2025",
            "gemini-1.5-flash",
        ]
    );
}

/// **VALUE**: Verifies a slow model is abandoned after the attempt timeout.
///
/// **BUG THIS CATCHES**: Would catch the timeout wrapping the whole chain instead of each
/// attempt, or relying on the HTTP client's much longer timeout.
#[tokio::test]
async fn given_slow_first_model_when_translate_then_times_out_and_falls_back() {
    // GIVEN: Model 1 answers after 2s, attempt timeout is 200ms, model 2 answers at once
    let server = MockServer::start().await;
    mount_reply(
        &server,
        "gemini-2.5-flash",
        ResponseTemplate::new(200)
            .set_body_json(success_body("Trop tard"))
            .set_delay(Duration::from_secs(2)),
    )
    .await;
    mount_reply(
        &server,
        "gemini-2.5-flash-lite-preview-09-2025",
        ResponseTemplate::new(200).set_body_json(success_body("Bonjour")),
    )
    .await;

    let pipeline = pipeline_against(&server, Duration::from_millis(200), QuotaPolicy::Terminal);

    // WHEN: Translating
    let started = std::time::Instant::now();
    let result = pipeline.translate(&french_request("Hello")).await;

    // THEN: The second model answers well before the slow reply would have arrived
    assert_eq!(result.expect("second model succeeds"), "Bonjour");
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn given_quota_on_first_model_and_terminal_policy_when_translate_then_stops() {
    // GIVEN: Model 1 is out of quota, model 2 would succeed
    let server = MockServer::start().await;
    mount_reply(
        &server,
        "gemini-2.5-flash",
        ResponseTemplate::new(429).set_body_json(quota_body()),
    )
    .await;
    mount_reply(
        &server,
        "gemini-2.5-flash-lite-preview-09-2025",
        ResponseTemplate::new(200).set_body_json(success_body("Bonjour")),
    )
    .await;

    let pipeline = pipeline_against(&server, DEFAULT_ATTEMPT_TIMEOUT, QuotaPolicy::Terminal);

    // WHEN: Translating
    let err = pipeline
        .translate(&french_request("Hello"))
        .await
        .expect_err("quota is terminal");

    // THEN: Quota error for model 1, and model 2 was never called
    match &err {
        TranslationError::QuotaExceeded { model, .. } => assert_eq!(model, "gemini-2.5-flash"),
        other => panic!("expected QuotaExceeded, got {other:?}"),
    }
    assert_eq!(requested_models(&server).await, vec!["gemini-2.5-flash"]);
}

#[tokio::test]
async fn given_quota_on_first_model_and_skip_policy_when_translate_then_falls_back() {
    // GIVEN: Same provider as above, with the skip policy
    let server = MockServer::start().await;
    mount_reply(
        &server,
        "gemini-2.5-flash",
        ResponseTemplate::new(429).set_body_json(quota_body()),
    )
    .await;
    mount_reply(
        &server,
        "gemini-2.5-flash-lite-preview-09-2025",
        ResponseTemplate::new(200).set_body_json(success_body("Bonjour")),
    )
    .await;

    let pipeline = pipeline_against(&server, DEFAULT_ATTEMPT_TIMEOUT, QuotaPolicy::SkipModel);

    // WHEN/THEN: The second model answers
    let result = pipeline.translate(&french_request("Hello")).await;
    assert_eq!(result.expect("fallback succeeds"), "Bonjour");
}

#[tokio::test]
async fn given_every_model_fails_when_translate_then_all_models_exhausted() {
    // GIVEN: A provider with no mocks, so every model gets 404
    let server = MockServer::start().await;
    let pipeline = pipeline_against(&server, DEFAULT_ATTEMPT_TIMEOUT, QuotaPolicy::Terminal);

    // WHEN: Translating
    let err = pipeline
        .translate(&french_request("Hello"))
        .await
        .expect_err("nothing can succeed");

    // THEN: Four attempts, one per model
    match &err {
        TranslationError::AllModelsExhausted { attempts, .. } => assert_eq!(*attempts, 4),
        other => panic!("expected AllModelsExhausted, got {other:?}"),
    }
    assert_eq!(requested_models(&server).await.len(), 4);
}
