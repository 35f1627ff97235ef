use translate_core::error::BackendError;

use common::HttpStatusCode;

/// **VALUE**: Verifies the provider's error envelope is parsed into status and message.
///
/// **WHY THIS MATTERS**: Quota detection relies on `error.status`, and the terminal
/// error shows `error.message` in the log.
///
/// **BUG THIS CATCHES**: Would catch the raw JSON body being kept as the message, which
/// hides `RESOURCE_EXHAUSTED` from classification.
#[test]
fn given_error_envelope_when_converted_then_status_and_message_are_extracted() {
    // GIVEN: A typical quota response body
    let body = r#"{"error":{"code":429,"status":"RESOURCE_EXHAUSTED","message":"Quota exceeded"}}"#;

    // WHEN: Building the backend error
    let err = BackendError::from_http_response("gemini-2.5-flash", HttpStatusCode(429), body);

    // THEN: Fields are populated and the error is a quota error
    assert!(err.is_quota_exhausted());
    assert_eq!(err.message(), "Quota exceeded");
    assert_eq!(err.status_code(), Some(429));
    assert_eq!(err.model(), Some("gemini-2.5-flash"));
    assert_eq!(err.error_category(), "quota");
    assert!(format!("{}", err).contains("backend.rs"));
}

#[test]
fn given_non_json_body_when_converted_then_body_becomes_message() {
    // GIVEN: A proxy error page
    let err = BackendError::from_http_response(
        "gemini-pro",
        HttpStatusCode(502),
        "  Bad Gateway  ",
    );

    // THEN: The trimmed body is the message and the error is not a quota error
    assert_eq!(err.message(), "Bad Gateway");
    assert!(!err.is_quota_exhausted());
    assert_eq!(err.error_category(), "server_error");
}
