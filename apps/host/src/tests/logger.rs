// Unit tests for logger module initialization logic
// Tests focus on thread-safety and error handling

use crate::error::HostError;
use crate::logger::{initialize, initialize_internal, level_from};

use std::path::PathBuf;

use log::LevelFilter;

use tempfile::TempDir;

/// **VALUE**: Verifies that calling initialize() multiple times doesn't panic or fail.
///
/// **WHY THIS MATTERS**: fern refuses to install a second global logger. Tests and the
/// binary may both reach `initialize`, and a second call must not abort startup.
///
/// **BUG THIS CATCHES**: Would catch if the Once or AtomicBool guards are removed,
/// causing fern to fail when trying to set a global logger twice.
#[test]
fn given_logger_initialized_when_called_again_then_returns_ok() {
    // GIVEN: A valid temporary directory
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    // WHEN: Calling initialize twice
    let result1 = initialize(temp_dir.path());
    let result2 = initialize(temp_dir.path());

    // THEN: Both should return Ok (second one logs warning but doesn't error)
    assert!(result1.is_ok(), "First initialization should succeed");
    assert!(
        result2.is_ok(),
        "Second initialization should succeed (idempotent)"
    );
}

/// **VALUE**: Verifies that an unwritable log directory is reported, not panicked on.
///
/// **WHY THIS MATTERS**: The log directory lives under the user's data dir; a read-only
/// home or full disk must produce a clear startup error.
///
/// **BUG THIS CATCHES**: Would catch if `fern::log_file()` is unwrapped instead of mapped
/// into a `HostError`.
#[test]
fn given_invalid_log_dir_when_initializing_then_returns_host_error() {
    // GIVEN: A path that cannot hold a file on Unix-like systems
    let invalid_dir = PathBuf::from("/dev/null/invalid-path");

    // WHEN: Building the dispatch (fails before any global logger is installed)
    let result = initialize_internal(&invalid_dir, LevelFilter::Info);

    // THEN: Host error naming the log file
    match result {
        Err(HostError::Host { message, .. }) => {
            assert!(message.contains("translate-host.log"), "got: {message}");
        }
        other => panic!("Expected HostError::Host, got {other:?}"),
    }
}

#[test]
fn given_level_values_when_parsing_then_known_levels_win_and_unknown_fall_back() {
    // GIVEN/WHEN/THEN: Case-insensitive level names are honored
    assert_eq!(level_from(Some("warn")), LevelFilter::Warn);
    assert_eq!(level_from(Some(" TRACE ")), LevelFilter::Trace);
    assert_eq!(level_from(Some("off")), LevelFilter::Off);

    // AND: Garbage and absence use the build default
    assert_eq!(level_from(Some("loud")), level_from(None));
}
