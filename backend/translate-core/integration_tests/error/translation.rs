use translate_core::error::TranslationError;
use translate_core::error::translation::ALL_MODELS_EXHAUSTED_MESSAGE;

/// **VALUE**: Verifies `TranslationError` display carries the call site.
///
/// **WHY THIS MATTERS**: The log line for a failed translation is the only trace of where
/// the chain gave up. The location pins it to the pipeline, not the router.
///
/// **BUG THIS CATCHES**: Would catch a dropped `#[track_caller]` on the constructors or a
/// Display format without `{location}`.
#[test]
fn given_exhausted_error_when_formatted_then_includes_location() {
    // GIVEN: An exhausted-chain error created here
    let err = TranslationError::all_models_exhausted(4, "output truncated at max tokens");

    // WHEN: Formatting the error as string
    let error_string = format!("{}", err);

    // THEN: Kind, details and this file's location are present
    assert!(error_string.contains("All Models Exhausted Error"));
    assert!(error_string.contains("4 attempt(s)"));
    assert!(error_string.contains("translation.rs"));
}

/// **VALUE**: Verifies the UI message never leaks internals.
///
/// **BUG THIS CATCHES**: Would catch the router sending `to_string()` (with file paths and
/// provider messages) instead of `user_message()`.
#[test]
fn given_each_error_when_user_message_then_no_location_or_details() {
    // GIVEN: One error of every kind
    let errors = [
        TranslationError::missing_credential(),
        TranslationError::empty_text(),
        TranslationError::quota_exceeded("gemini-2.5-flash", "Quota exceeded for metric x"),
        TranslationError::all_models_exhausted(4, "HTTP 500"),
    ];

    // WHEN/THEN: Messages are plain and stable
    for err in &errors {
        let message = err.user_message();
        assert!(!message.contains(".rs"), "{message}");
        assert!(!message.contains("metric"), "{message}");
    }
    assert_eq!(errors[3].user_message(), ALL_MODELS_EXHAUSTED_MESSAGE);
    assert_eq!(errors[2].error_category(), "quota_exceeded");
    assert!(!errors[2].is_input_error());
}
