// Unit tests for error module
// Tests location capture and core error conversion

use crate::error::HostError;

use translate_core::error::ConfigError;

/// **VALUE**: Verifies host errors point at the host call site.
///
/// **WHY THIS MATTERS**: Startup failures are printed to stderr and the log; the location
/// is the quickest way to tell a path problem from a config problem.
///
/// **BUG THIS CATCHES**: Would catch a missing `#[track_caller]` on `HostError::host`.
#[test]
fn given_host_error_when_formatted_then_includes_location() {
    // GIVEN: A host error created here
    let err = HostError::host("No platform config directory");

    // WHEN: Formatting
    let text = format!("{}", err);

    // THEN: Kind, message and this file
    assert!(text.starts_with("Host Error: No platform config directory"));
    assert!(text.contains("error.rs"), "location missing: {text}");
}

#[test]
fn given_config_error_when_converted_then_core_variant_keeps_message() {
    // GIVEN: A validation error from the core crate
    let core = ConfigError::validation("Model list cannot be empty");

    // WHEN: Converting with `?`-style From
    let err = HostError::from(core);

    // THEN: Core variant with the original text
    assert!(matches!(err, HostError::Core { .. }));
    assert!(format!("{}", err).contains("Model list cannot be empty"));
}
