use super::support::{QUOTA_BODY, parse_response, response_with_text};
use crate::error::BackendError;
use crate::pipeline::{AttemptOutcome, FailureReason, QuotaPolicy, classify};

use common::HttpStatusCode;

use serde_json::json;

fn quota_error() -> BackendError {
    BackendError::from_http_response("gemini-2.5-flash", HttpStatusCode(429), QUOTA_BODY)
}

/// **VALUE**: Verifies quota exhaustion ends the chain under the default policy.
///
/// **WHY THIS MATTERS**: Free-tier quota is shared by every model on the key; hammering the
/// remaining models only burns more of it.
///
/// **BUG THIS CATCHES**: Would catch quota errors being treated like ordinary HTTP failures.
#[test]
fn given_quota_error_and_terminal_policy_when_classified_then_terminal() {
    let outcome = classify(Err(quota_error()), QuotaPolicy::Terminal);

    assert!(matches!(
        outcome,
        AttemptOutcome::TerminalFailure(FailureReason::Backend(_))
    ));
    assert_eq!(outcome.label(), "terminal");
}

#[test]
fn given_quota_error_and_skip_policy_when_classified_then_retryable() {
    let outcome = classify(Err(quota_error()), QuotaPolicy::SkipModel);

    assert!(matches!(outcome, AttemptOutcome::RetryableFailure(_)));
}

/// **VALUE**: Verifies the provider status string alone marks quota exhaustion.
///
/// **BUG THIS CATCHES**: Would catch detection that only looks at HTTP 429.
#[test]
fn given_resource_exhausted_status_without_429_when_classified_then_terminal() {
    let error = BackendError::from_http_response(
        "gemini-2.5-flash",
        HttpStatusCode(403),
        r#"{"error":{"code":403,"status":"RESOURCE_EXHAUSTED","message":"limit"}}"#,
    );

    assert!(error.is_quota_exhausted());
    assert!(matches!(
        classify(Err(error), QuotaPolicy::Terminal),
        AttemptOutcome::TerminalFailure(_)
    ));
}

#[test]
fn given_server_error_when_classified_then_retryable() {
    let error =
        BackendError::from_http_response("gemini-2.5-flash", HttpStatusCode(503), "unavailable");

    assert!(matches!(
        classify(Err(error), QuotaPolicy::Terminal),
        AttemptOutcome::RetryableFailure(FailureReason::Backend(_))
    ));
}

#[test]
fn given_max_tokens_finish_reason_when_classified_then_truncated() {
    let response = parse_response(json!({
        "candidates": [{ "finishReason": "MAX_TOKENS", "content": { "parts": [{ "text": "Bonj" }] } }]
    }));

    assert!(matches!(
        classify(Ok(response), QuotaPolicy::Terminal),
        AttemptOutcome::RetryableFailure(FailureReason::Truncated)
    ));
}

#[test]
fn given_no_candidate_or_blank_text_when_classified_then_empty_candidate() {
    let empty = parse_response(json!({}));
    let blank = response_with_text("   ");
    let no_content = parse_response(json!({ "candidates": [{ "finishReason": "SAFETY" }] }));

    for response in [empty, blank, no_content] {
        assert!(matches!(
            classify(Ok(response), QuotaPolicy::Terminal),
            AttemptOutcome::RetryableFailure(FailureReason::EmptyCandidate)
        ));
    }
}

/// **VALUE**: Verifies success carries the raw, unsanitized text.
///
/// **BUG THIS CATCHES**: Would catch double sanitization if classify started cleaning text.
#[test]
fn given_text_when_classified_then_success_with_raw_text() {
    let outcome = classify(Ok(response_with_text("**Bonjour**")), QuotaPolicy::Terminal);

    match outcome {
        AttemptOutcome::Success(text) => assert_eq!(text, "**Bonjour**"),
        other => panic!("expected success, got {}", other.label()),
    }
}
